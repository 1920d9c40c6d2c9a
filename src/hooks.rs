use crate::cache::ChromeStorage;
use crate::company::{load_company_table, CompanyTable};
use crate::config::DEFAULT_COMPANY;
use crate::SortKey;
use gloo_timers::callback::Timeout;
use log::error;
use std::rc::Rc;
use yew::prelude::*;

/// State and callbacks of the company page.
#[derive(Clone)]
pub struct CompanyTableState {
    /// Selected company; the default until the cache has been read.
    pub company: String,
    /// `None` while loading.
    pub table: Option<Rc<CompanyTable>>,
    pub error: Option<String>,
    /// Re-sort the current rows.
    pub on_sort: Callback<SortKey>,
}

/// Loads the clicked company's problems once, sorted by score.
#[hook]
pub fn use_company_table() -> CompanyTableState {
    let company = use_state(|| DEFAULT_COMPANY.to_string());
    let table = use_state(|| None::<Rc<CompanyTable>>);
    let error_message = use_state(|| None::<String>);

    {
        let company = company.clone();
        let table = table.clone();
        let error_message = error_message.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match load_company_table(&ChromeStorage).await {
                    Ok(loaded) => {
                        company.set(loaded.company().to_string());
                        table.set(Some(Rc::new(loaded)));
                    }
                    Err(e) => {
                        error!("Failed to load company problems: {}", e);
                        error_message.set(Some(e.to_string()));
                    }
                }
            });
            || ()
        });
    }

    let on_sort = {
        let table = table.clone();
        Callback::from(move |key: SortKey| {
            if let Some(current) = (*table).as_ref() {
                let mut sorted = CompanyTable::clone(current);
                sorted.sort_by(key);
                table.set(Some(Rc::new(sorted)));
            }
        })
    };

    CompanyTableState {
        company: (*company).clone(),
        table: (*table).clone(),
        error: (*error_message).clone(),
        on_sort,
    }
}

/// Info line with temporary messages.
#[derive(Clone)]
pub struct InfoMessage {
    pub text: String,
    /// Replace the text.
    pub set: Callback<String>,
    /// Show a message for `ms` milliseconds, then restore the previous text.
    pub flash: Callback<(String, u32)>,
}

#[hook]
pub fn use_info_message() -> InfoMessage {
    let text = use_state(String::new);

    let set = {
        let text = text.clone();
        Callback::from(move |message: String| text.set(message))
    };

    let flash = {
        let text = text.clone();
        Callback::from(move |(message, ms): (String, u32)| {
            let previous = (*text).clone();
            text.set(message);
            let text = text.clone();
            Timeout::new(ms, move || text.set(previous)).forget();
        })
    };

    InfoMessage {
        text: (*text).clone(),
        set,
        flash,
    }
}
