//! Query-parameter parsing for member listings
//!
//! `GET /members?page=0&size=3&sort=username,desc&sort=id,asc&age=10` — the
//! `sort` key may repeat for multi-key sorts, a bare `sort=field` defaults
//! ascending. Parsing works over the raw key/value pairs so repeated keys
//! survive.

use thiserror::Error;

use crate::config::PageLimits;
use crate::domain::page::{Direction, PageRequest, Sort, SortField, SortOrder};
use crate::domain::repositories::MemberFilter;

/// Rejected request parameter, with the offending value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid page number: '{0}'")]
    InvalidPage(String),

    #[error("invalid page size: '{0}'")]
    InvalidSize(String),

    #[error("unknown sort field: '{0}'")]
    UnknownSortField(String),

    #[error("invalid sort direction: '{0}'")]
    InvalidDirection(String),

    #[error("invalid age filter: '{0}'")]
    InvalidAge(String),
}

/// Parsed `GET /members` query string
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page: PageRequest,
    pub sort: Sort,
    pub filter: MemberFilter,
}

impl ListParams {
    /// Parses raw query pairs, applying the configured page defaults
    ///
    /// Missing `page` is 0 and missing `size` is the configured default.
    /// A size of 0 (or anything unparseable, including negatives) is
    /// rejected; an oversized one is clamped to the configured maximum.
    /// Unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)], limits: PageLimits) -> Result<Self, ParamError> {
        let mut page: u32 = 0;
        let mut size = limits.default_size;
        let mut orders = Vec::new();
        let mut filter = MemberFilter::default();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    page = value
                        .parse()
                        .map_err(|_| ParamError::InvalidPage(value.clone()))?;
                }
                "size" => {
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ParamError::InvalidSize(value.clone()))?;
                    if parsed == 0 {
                        return Err(ParamError::InvalidSize(value.clone()));
                    }
                    size = parsed.min(limits.max_size);
                }
                "sort" => orders.push(parse_sort(value)?),
                "username" => filter.username = Some(value.clone()),
                "age" => {
                    filter.age = Some(
                        value
                            .parse()
                            .map_err(|_| ParamError::InvalidAge(value.clone()))?,
                    );
                }
                _ => {}
            }
        }

        Ok(Self {
            page: PageRequest::of(page, size),
            sort: Sort::from_orders(orders),
            filter,
        })
    }
}

fn parse_sort(value: &str) -> Result<SortOrder, ParamError> {
    let mut parts = value.splitn(2, ',');
    let field_raw = parts.next().unwrap_or_default();
    let field = SortField::parse(field_raw)
        .ok_or_else(|| ParamError::UnknownSortField(field_raw.to_string()))?;
    let direction = match parts.next() {
        None => Direction::Asc,
        Some(raw) => {
            Direction::parse(raw).ok_or_else(|| ParamError::InvalidDirection(raw.to_string()))?
        }
    };

    Ok(SortOrder { field, direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PageLimits {
        PageLimits {
            default_size: 20,
            max_size: 100,
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let params = ListParams::from_pairs(&[], limits()).unwrap();

        assert_eq!(params.page, PageRequest::of(0, 20));
        assert!(params.sort.is_unsorted());
        assert_eq!(params.filter, MemberFilter::default());
    }

    #[test]
    fn parses_page_size_and_sort() {
        let params = ListParams::from_pairs(
            &pairs(&[("page", "2"), ("size", "3"), ("sort", "username,desc")]),
            limits(),
        )
        .unwrap();

        assert_eq!(params.page, PageRequest::of(2, 3));
        assert_eq!(
            params.sort,
            Sort::by(SortField::Username, Direction::Desc)
        );
    }

    #[test]
    fn repeated_sort_keys_keep_precedence_order() {
        let params = ListParams::from_pairs(
            &pairs(&[("sort", "age,desc"), ("sort", "username")]),
            limits(),
        )
        .unwrap();

        let orders = params.sort.orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].field, SortField::Age);
        assert_eq!(orders[0].direction, Direction::Desc);
        assert_eq!(orders[1].field, SortField::Username);
        assert_eq!(orders[1].direction, Direction::Asc);
    }

    #[test]
    fn zero_size_is_rejected() {
        let result = ListParams::from_pairs(&pairs(&[("size", "0")]), limits());

        assert_eq!(result, Err(ParamError::InvalidSize("0".to_string())));
    }

    #[test]
    fn negative_size_is_rejected() {
        let result = ListParams::from_pairs(&pairs(&[("size", "-1")]), limits());

        assert_eq!(result, Err(ParamError::InvalidSize("-1".to_string())));
    }

    #[test]
    fn oversized_page_is_clamped() {
        let params = ListParams::from_pairs(&pairs(&[("size", "5000")]), limits()).unwrap();

        assert_eq!(params.page.size(), 100);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let result = ListParams::from_pairs(&pairs(&[("sort", "team,asc")]), limits());

        assert_eq!(result, Err(ParamError::UnknownSortField("team".to_string())));
    }

    #[test]
    fn bad_direction_is_rejected() {
        let result = ListParams::from_pairs(&pairs(&[("sort", "age,sideways")]), limits());

        assert_eq!(
            result,
            Err(ParamError::InvalidDirection("sideways".to_string()))
        );
    }

    #[test]
    fn filter_params_populate_the_filter() {
        let params = ListParams::from_pairs(
            &pairs(&[("age", "10"), ("username", "member1")]),
            limits(),
        )
        .unwrap();

        assert_eq!(params.filter.age, Some(10));
        assert_eq!(params.filter.username.as_deref(), Some("member1"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let params =
            ListParams::from_pairs(&pairs(&[("color", "green"), ("page", "1")]), limits()).unwrap();

        assert_eq!(params.page.page(), 1);
    }
}
