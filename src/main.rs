//! Company problems page.
//! Shows the problems asked by the company last clicked in the popup.

use leetcode_assistant::components::ProblemTable;
use leetcode_assistant::hooks::use_company_table;
use yew::prelude::*;

#[function_component(CompanyPage)]
fn company_page() -> Html {
    let state = use_company_table();

    {
        let company = state.company.clone();
        use_effect_with(company, |company| {
            gloo_utils::document().set_title(&format!("{} Questions", company));
            || ()
        });
    }

    html! {
        <div class="company-page">
            <h1 id="title">{ &state.company }</h1>
            if let Some(err) = &state.error {
                <div class="current-error">{ err }</div>
            }
            if let Some(table) = &state.table {
                <ProblemTable table={table.clone()} on_sort={state.on_sort.clone()} />
            } else if state.error.is_none() {
                <p class="loading">{ "Loading problems..." }</p>
            }
        </div>
    }
}

/// Entry point: initializes the Yew renderer for the company page.
fn main() {
    leetcode_assistant::init_context();
    yew::Renderer::<CompanyPage>::new().render();
}
