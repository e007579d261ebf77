//! Page-number handling for listing URLs

use url::Url;

/// Returns `url` with its page-number parameter set to `page`
///
/// The parameter is replaced in place when present and appended otherwise;
/// every other query pair is kept in order.
pub fn with_page(url: &Url, param: &str, page: u32) -> Url {
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let page = page.to_string();

    let mut paged = url.clone();
    {
        let mut query = paged.query_pairs_mut();
        query.clear();

        let mut replaced = false;
        for (key, value) in &pairs {
            if key == param {
                if !replaced {
                    query.append_pair(key, &page);
                    replaced = true;
                }
            } else {
                query.append_pair(key, value);
            }
        }

        if !replaced {
            query.append_pair(param, &page);
        }
    }

    paged
}

/// Resolves a possibly negative position against a list of `len` items
pub fn resolve_index(len: usize, index: i32) -> Option<usize> {
    if index >= 0 {
        let index = index as usize;
        (index < len).then_some(index)
    } else {
        len.checked_sub(index.unsigned_abs() as usize)
    }
}

/// Total page count read from the texts of the pagination controls
///
/// A missing indicator, or one whose text is not a number, means a single page.
pub fn page_count<S: AsRef<str>>(controls: &[S], index: i32) -> u32 {
    resolve_index(controls.len(), index)
        .and_then(|i| controls[i].as_ref().trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}
