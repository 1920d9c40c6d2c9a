//! Company problem table state: filter the cached dataset down to one
//! company, then sort on demand.

use crate::cache::Storage;
use crate::config::{DEFAULT_COMPANY, KEY_CLICKED_COMPANY, KEY_PROBLEMS};
use crate::utils::{compare_titles, problem_url};
use crate::{CompanyProblem, ExtensionError, ProblemDataset, SortKey};
use log::{debug, info};

/// Flatten every question's company entries, keeping those named `company`.
///
/// Output order follows the dataset but callers must not rely on it.
pub fn load_problems(company: &str, dataset: &ProblemDataset) -> Vec<CompanyProblem> {
    let problems: Vec<CompanyProblem> = dataset
        .questions
        .iter()
        .filter_map(|q| q.companies.as_ref().map(|cs| (q, cs)))
        .flat_map(|(q, companies)| {
            companies
                .iter()
                .filter(move |c| c.name == company)
                .map(move |c| CompanyProblem {
                    id: q.frontend_id,
                    title: q.title.clone(),
                    score: c.score,
                    url: problem_url(&q.title),
                })
        })
        .collect();

    debug!("Loaded {} problems for {}", problems.len(), company);
    problems
}

/// Stable sort by `key`. Scores descend, ids and titles ascend.
pub fn sort_problems(mut items: Vec<CompanyProblem>, key: SortKey) -> Vec<CompanyProblem> {
    match key {
        SortKey::ById => items.sort_by(|a, b| a.id.cmp(&b.id)),
        SortKey::ByTitle => items.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::ByScore => items.sort_by(|a, b| b.score.total_cmp(&a.score)),
    }
    items
}

/// Problems of one company, always ordered by the last applied key.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyTable {
    company: String,
    rows: Vec<CompanyProblem>,
    sort_key: SortKey,
}

impl CompanyTable {
    /// Build the table for `company`, sorted by score.
    pub fn load(company: impl Into<String>, dataset: &ProblemDataset) -> Self {
        let company = company.into();
        let rows = sort_problems(load_problems(&company, dataset), SortKey::ByScore);
        Self {
            company,
            rows,
            sort_key: SortKey::ByScore,
        }
    }

    pub fn sort_by(&mut self, key: SortKey) {
        let rows = std::mem::take(&mut self.rows);
        self.rows = sort_problems(rows, key);
        self.sort_key = key;
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn rows(&self) -> &[CompanyProblem] {
        &self.rows
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }
}

/// Table for the company last clicked, read from the cache.
///
/// A missing company falls back to the default one; a missing dataset yields
/// an empty table.
pub async fn load_company_table<S: Storage>(storage: &S) -> Result<CompanyTable, ExtensionError> {
    let company = storage
        .get::<String>(KEY_CLICKED_COMPANY)
        .await?
        .unwrap_or_else(|| DEFAULT_COMPANY.to_string());
    let dataset = storage.get::<ProblemDataset>(KEY_PROBLEMS).await?.unwrap_or_default();
    let table = CompanyTable::load(company, &dataset);
    info!("{} problems for {}", table.rows().len(), table.company());
    Ok(table)
}
