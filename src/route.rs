//! Route parsing for the two storefront pages.

use crate::state::{FiltersPatch, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` with optional filter query (`category1`, `category2`, `search`,
    /// `sort`, `limit`).
    ProductList { filters: FiltersPatch, limit: Option<u32> },
    /// `/product/{id}`
    ProductDetail { product_id: String },
    NotFound { path: String },
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let trimmed = path_part.trim_end_matches('/');

        if trimmed.is_empty() {
            let (filters, limit) = query.map(parse_list_query).unwrap_or_default();
            return Route::ProductList { filters, limit };
        }

        if let Some(id) = trimmed.strip_prefix("/product/") {
            let id = percent_decode(id);
            if !id.is_empty() && !id.contains('/') {
                return Route::ProductDetail { product_id: id };
            }
        }

        Route::NotFound {
            path: path.to_string(),
        }
    }

    pub fn product(product_id: &str) -> String {
        format!("/product/{}", percent_encode(product_id))
    }

    /// List path narrowed to the given categories.
    pub fn list_with_categories(category1: Option<&str>, category2: Option<&str>) -> String {
        let params: Vec<String> = [("category1", category1), ("category2", category2)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}={}", key, percent_encode(v)))
            })
            .collect();
        if params.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", params.join("&"))
        }
    }
}

fn parse_list_query(query: &str) -> (FiltersPatch, Option<u32>) {
    let mut filters = FiltersPatch::default();
    let mut limit = None;
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(value);
        match key {
            "search" => filters.search = Some(value),
            "category1" => filters.category1 = Some(value),
            "category2" => filters.category2 = Some(value),
            "sort" => filters.sort = value.parse::<SortOrder>().ok(),
            "limit" => limit = value.parse::<u32>().ok().filter(|l| *l > 0),
            _ => {}
        }
    }
    (filters, limit)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(high), Some(low)) => {
                    out.push(high << 4 | low);
                    i += 3;
                    continue;
                }
                _ => out.push(b'%'),
            },
            b'+' => out.push(b' '),
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|d| d as u8)
}
