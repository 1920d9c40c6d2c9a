//! Pure Yew view components for the company page and the popup.
//!
//! This module contains stateless components that render based on props.

use crate::company::CompanyTable;
use crate::{CompanyProblem, SortKey};
use std::rc::Rc;
use yew::prelude::*;

/// Header cells of the problem table, left to right.
pub const TABLE_HEADERS: [(&str, SortKey); 3] = [
    ("#", SortKey::ById),
    ("Title", SortKey::ByTitle),
    ("Score", SortKey::ByScore),
];

/// What one data row shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRow {
    /// Unique within one rendering, even for repeated titles.
    pub key: String,
    pub id: u32,
    pub title: String,
    pub href: String,
    pub score: String,
}

/// One row per problem, in sequence order.
pub fn problem_rows(problems: &[CompanyProblem]) -> Vec<ProblemRow> {
    problems
        .iter()
        .enumerate()
        .map(|(idx, problem)| ProblemRow {
            key: format!("{}-{}", idx, problem.id),
            id: problem.id,
            title: problem.title.clone(),
            href: problem.url.clone(),
            score: problem.score.to_string(),
        })
        .collect()
}

fn render_problem_row(row: ProblemRow) -> Html {
    html! {
        <tr key={row.key}>
            <td>{ row.id }</td>
            <td>
                <a href={row.href} target="_blank">{ row.title }</a>
            </td>
            <td>{ row.score }</td>
        </tr>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProblemTableProps {
    pub table: Rc<CompanyTable>,
    pub on_sort: Callback<SortKey>,
}

/// Company problem table. Clicking a header re-sorts by that column; the
/// header row is kept and every data row is rebuilt from the current order.
#[function_component(ProblemTable)]
pub fn problem_table(props: &ProblemTableProps) -> Html {
    let header = |id: &'static str, key: SortKey| {
        let on_sort = props.on_sort.clone();
        let active = props.table.sort_key() == key;
        html! {
            <th id={id} class={classes!("sortable", active.then_some("sorted"))}
                onclick={Callback::from(move |_| on_sort.emit(key))}>
                { id }
            </th>
        }
    };

    html! {
        <table id="solutionTable">
            <tr>
                { for TABLE_HEADERS.iter().map(|&(id, key)| header(id, key)) }
            </tr>
            { for problem_rows(props.table.rows()).into_iter().map(render_problem_row) }
        </table>
    }
}

/// Text of a response panel.
///
/// Syntax highlighting rewrites the panel's code element behind the
/// renderer's back, so `generation` moves on every time the panel is emptied
/// and the element is rebuilt rather than patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelText {
    pub text: String,
    pub generation: u32,
}

impl PanelText {
    /// Empty panel on a fresh code element.
    pub fn cleared(&self) -> Self {
        Self {
            text: String::new(),
            generation: self.generation.wrapping_add(1),
        }
    }

    /// Same element, new text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation: self.generation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Properties, PartialEq)]
pub struct ResponsePanelProps {
    pub text: PanelText,
    #[prop_or_default]
    pub language: Option<AttrValue>,
    pub hidden: bool,
}

/// Code block holding a streamed or restored response.
#[function_component(ResponsePanel)]
pub fn response_panel(props: &ResponsePanelProps) -> Html {
    let language = props.language.as_ref().map(|l| format!("language-{}", l));
    html! {
        <pre class={classes!("response", props.hidden.then_some("hidden"))}>
            <code key={props.text.generation.to_string()} class={classes!(language)}>
                { props.text.text.clone() }
            </code>
        </pre>
    }
}
