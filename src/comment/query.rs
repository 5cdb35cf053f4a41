use serde::Deserialize;

use crate::comment::status::CommentStatus;
use crate::utils::error::CustomError;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// Raw request-level filter parameters, exactly as they arrive on the query
/// string. Parsing and validation happen in [`build`] so that a bad value is
/// reported against its parameter name instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub post: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub order: Option<String>,
    pub orderby: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Date,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// The validated, deterministic query handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub post: Option<u64>,
    /// `None` means no status restriction.
    pub status: Option<CommentStatus>,
    /// `Some(0)` selects anonymous comments.
    pub author: Option<u64>,
    pub search: Option<String>,
    pub orderby: OrderBy,
    pub order: Order,
    pub page: usize,
    pub per_page: usize,
}

/// Translate the request parameters into a `CommentQuery`. Callers without
/// moderation capability default to the approved slice of the collection;
/// moderators default to everything.
pub fn build(params: &ListParams, moderator: bool) -> Result<CommentQuery, CustomError> {
    let post = parse_id("post", params.post.as_deref())?;
    let author = parse_id("author", params.author.as_deref())?;

    let status = match params.status.as_deref() {
        Some(raw) => Some(CommentStatus::parse(raw)?),
        None if moderator => None,
        None => Some(CommentStatus::Approved),
    };

    let orderby = match params.orderby.as_deref() {
        None | Some("date") => OrderBy::Date,
        Some("id") => OrderBy::Id,
        Some(other) => {
            return Err(CustomError::ValidationError(format!(
                "invalid value for parameter `orderby`: `{}`",
                other
            )));
        }
    };

    let order = match params.order.as_deref() {
        None | Some("desc") => Order::Desc,
        Some("asc") => Order::Asc,
        Some(other) => {
            return Err(CustomError::ValidationError(format!(
                "invalid value for parameter `order`: `{}`",
                other
            )));
        }
    };

    let page = match parse_number("page", params.page.as_deref())? {
        None => 1,
        Some(0) => {
            return Err(CustomError::ValidationError(
                "invalid value for parameter `page`: must be at least 1".into(),
            ));
        }
        Some(n) => n,
    };

    let per_page = match parse_number("per_page", params.per_page.as_deref())? {
        None => DEFAULT_PER_PAGE,
        Some(n) if (1..=MAX_PER_PAGE).contains(&n) => n,
        Some(_) => {
            return Err(CustomError::ValidationError(format!(
                "invalid value for parameter `per_page`: must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
    };

    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(CommentQuery {
        post,
        status,
        author,
        search,
        orderby,
        order,
        page,
        per_page,
    })
}

fn parse_id(name: &str, raw: Option<&str>) -> Result<Option<u64>, CustomError> {
    match raw {
        None => Ok(None),
        Some(value) => value.parse::<u64>().map(Some).map_err(|_| {
            CustomError::ValidationError(format!(
                "invalid value for parameter `{}`: `{}`",
                name, value
            ))
        }),
    }
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<usize>, CustomError> {
    match raw {
        None => Ok(None),
        Some(value) => value.parse::<usize>().map(Some).map_err(|_| {
            CustomError::ValidationError(format!(
                "invalid value for parameter `{}`: `{}`",
                name, value
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_restrict_non_moderators_to_approved() {
        let query = build(&ListParams::default(), false).unwrap();
        assert_eq!(query.status, Some(CommentStatus::Approved));
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.orderby, OrderBy::Date);
        assert_eq!(query.order, Order::Desc);
    }

    #[test]
    fn moderators_default_to_all_statuses() {
        let query = build(&ListParams::default(), true).unwrap();
        assert_eq!(query.status, None);
    }

    #[test]
    fn explicit_status_is_parsed_with_aliases() {
        let params = ListParams {
            status: Some("1".into()),
            ..ListParams::default()
        };
        let query = build(&params, false).unwrap();
        assert_eq!(query.status, Some(CommentStatus::Approved));
    }

    #[test]
    fn invalid_post_filter_names_the_parameter() {
        let params = ListParams {
            post: Some("abc".into()),
            ..ListParams::default()
        };
        let err = build(&params, false).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("`post`"));
    }

    #[test]
    fn invalid_page_names_the_parameter() {
        let params = ListParams {
            page: Some("zero".into()),
            ..ListParams::default()
        };
        let err = build(&params, false).unwrap_err();
        assert!(err.to_string().contains("`page`"));

        let params = ListParams {
            page: Some("0".into()),
            ..ListParams::default()
        };
        let err = build(&params, false).unwrap_err();
        assert!(err.to_string().contains("`page`"));
    }

    #[test]
    fn per_page_is_capped() {
        let params = ListParams {
            per_page: Some("101".into()),
            ..ListParams::default()
        };
        let err = build(&params, false).unwrap_err();
        assert!(err.to_string().contains("`per_page`"));
    }

    #[test]
    fn unknown_ordering_is_rejected() {
        let params = ListParams {
            orderby: Some("karma".into()),
            ..ListParams::default()
        };
        assert!(build(&params, false).is_err());

        let params = ListParams {
            order: Some("sideways".into()),
            ..ListParams::default()
        };
        assert!(build(&params, false).is_err());
    }

    #[test]
    fn blank_search_is_dropped() {
        let params = ListParams {
            search: Some("   ".into()),
            ..ListParams::default()
        };
        let query = build(&params, false).unwrap();
        assert_eq!(query.search, None);
    }
}
