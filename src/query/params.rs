//! Conversion between [`Query`] and HTTP query parameters.
//!
//! ```text
//! start(10).count(30)                     ?start=10&count=30
//! range(a, b)                             ?range=<a rfc3339>,<b rfc3339>
//! sort_by("title")                        ?sort=title
//! reverse()                               ?reverse
//! match_field("title", "cool")            ?match=title:cool
//! ... .match_field("content", "wow")      ?match=title:cool&match=content:wow
//! find("id", "42")                        ?id=42
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Query, QueryBuilder};
use crate::error::QueryError;

/// Build a [`Query`] from `(key, value)` pairs, e.g. `url.query_pairs()`.
///
/// Keys are handled in order of first appearance. `id`, `title` and
/// `created` use the last value given for that key, `start`, `count`,
/// `sort`, `reverse` and `range` the first, and every `match` value adds a
/// filter. Unknown keys are ignored.
pub fn from_params<I, K, V>(params: I) -> Result<Query, QueryError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref().to_string());
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => grouped.push((key.to_string(), vec![value])),
        }
    }

    let mut b = QueryBuilder::new();
    for (key, values) in &grouped {
        let first = values[0].as_str();
        let last = values[values.len() - 1].as_str();
        b = match key.as_str() {
            "id" | "title" | "created" => b.find(key, last),
            "start" => b.start(parse_pos("start", first)?),
            "count" => b.count(parse_pos("count", first)?),
            "sort" => b.sort_by(first),
            "reverse" if first.is_empty() || first == "true" => b.reverse(),
            "match" => {
                for m in values {
                    let pair: Vec<&str> = m.split(':').collect();
                    if pair.len() != 2 {
                        return Err(QueryError::MalformedMatch(m.clone()));
                    }
                    b = b.match_field(pair[0], pair[1]);
                }
                b
            }
            "range" => {
                let pair: Vec<&str> = first.split(',').collect();
                if pair.len() != 2 {
                    return Err(QueryError::MalformedRange(first.to_string()));
                }
                let start = parse_time("range start", pair[0])?;
                let end = parse_time("range end", pair[1])?;
                b.range(start, end)
            }
            _ => b,
        };
    }

    b.build()
}

/// Encode `query` as parameters [`from_params`] turns back into the same query.
pub fn to_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(find) = &query.find {
        params.push((find.name.as_str().to_string(), find.value.clone()));
    }
    if let Some(start) = query.start {
        params.push(("start".to_string(), start.to_string()));
    }
    if let Some(count) = query.count {
        params.push(("count".to_string(), count.to_string()));
    }
    for m in &query.matches {
        params.push(("match".to_string(), format!("{}:{}", m.name, m.value)));
    }
    if let Some(range) = &query.range {
        params.push((
            "range".to_string(),
            format!("{},{}", format_time(&range.start), format_time(&range.end)),
        ));
    }
    params.push(("sort".to_string(), query.sort_by.as_str().to_string()));
    params.push(("reverse".to_string(), query.reverse.to_string()));
    params
}

fn parse_pos(name: &'static str, value: &str) -> Result<u32, QueryError> {
    value.parse::<u32>().map_err(|_| QueryError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

fn parse_time(what: &'static str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| QueryError::InvalidTimestamp {
            what,
            value: value.to_string(),
        })
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Field, FieldName, SortField};
    use chrono::TimeZone;
    use url::Url;

    fn parse(raw: &str) -> Query {
        let url = Url::parse(raw).unwrap();
        Query::from_url(&url).unwrap_or_else(|e| panic!("{raw} should be parsable: {e}"))
    }

    fn parse_err(raw: &str) -> QueryError {
        let url = Url::parse(raw).unwrap();
        Query::from_url(&url).unwrap_err()
    }

    #[test]
    fn no_params_is_default() {
        assert!(parse("http://not.es/find").is_default());
    }

    #[test]
    fn find_by_id() {
        let q = parse("http://not.es/find?id=1");
        assert_eq!(q.find, Some(Field::new(FieldName::Id, "1")));
    }

    #[test]
    fn later_find_key_wins() {
        let q = parse("http://not.es/find?id=1&title=Hello,%20World!");
        assert_eq!(q.find, Some(Field::new(FieldName::Title, "Hello, World!")));
    }

    #[test]
    fn repeated_find_uses_last_value() {
        let q = parse("http://not.es/find?id=1&id=2");
        assert_eq!(q.find, Some(Field::new(FieldName::Id, "2")));

        let q = parse("http://not.es/find?title=hey&title=ho");
        assert_eq!(q.find, Some(Field::new(FieldName::Title, "ho")));
    }

    #[test]
    fn start_and_count() {
        assert_eq!(parse("http://not.es/find?start=42").start, Some(42));
        assert_eq!(parse("http://not.es/find?count=42").count, Some(42));
    }

    #[test]
    fn negative_or_garbage_numbers_fail() {
        assert_eq!(
            parse_err("http://not.es/find?start=-1"),
            QueryError::InvalidNumber {
                name: "start",
                value: "-1".into(),
            }
        );
        assert!(matches!(
            parse_err("http://not.es/find?count=many"),
            QueryError::InvalidNumber { name: "count", .. }
        ));
    }

    #[test]
    fn sort() {
        assert_eq!(parse("http://not.es/find").sort_by, SortField::Created);
        assert_eq!(parse("http://not.es/find?sort=created").sort_by, SortField::Created);
        assert_eq!(parse("http://not.es/find?sort=title").sort_by, SortField::Title);
        assert!(matches!(
            parse_err("http://not.es/find?sort=content"),
            QueryError::InvalidField { op: "sort", .. }
        ));
    }

    #[test]
    fn reverse() {
        assert!(parse("http://not.es/find?reverse").reverse);
        assert!(parse("http://not.es/find?reverse=true").reverse);
        assert!(!parse("http://not.es/find?reverse=false").reverse);
        assert!(!parse("http://not.es/find").reverse);
    }

    #[test]
    fn matches() {
        assert!(parse("http://not.es/find").matches.is_empty());

        let q = parse("http://not.es/find?match=id:x");
        assert_eq!(q.matches, vec![Field::new(FieldName::Id, "x")]);

        let q = parse("http://not.es/find?match=title:cool&match=content:very");
        assert_eq!(
            q.matches,
            vec![
                Field::new(FieldName::Title, "cool"),
                Field::new(FieldName::Content, "very"),
            ]
        );
    }

    #[test]
    fn malformed_match_fails() {
        assert_eq!(
            parse_err("http://not.es/find?match=title"),
            QueryError::MalformedMatch("title".into())
        );
        assert!(matches!(
            parse_err("http://not.es/find?match=a:b:c"),
            QueryError::MalformedMatch(_)
        ));
        assert!(matches!(
            parse_err("http://not.es/find?match=created:2015"),
            QueryError::InvalidField { op: "match", .. }
        ));
    }

    #[test]
    fn range() {
        let q = parse("http://not.es/find?range=2015-03-03T09:35:00Z,2015-03-09T10:50:00Z");
        let range = q.range.unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2015, 3, 3, 9, 35, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2015, 3, 9, 10, 50, 0).unwrap());
    }

    #[test]
    fn malformed_range_fails() {
        assert!(matches!(
            parse_err("http://not.es/find?range=2015-03-03T09:35:00Z"),
            QueryError::MalformedRange(_)
        ));
        assert!(matches!(
            parse_err("http://not.es/find?range=yesterday,2015-03-09T10:50:00Z"),
            QueryError::InvalidTimestamp { what: "range start", .. }
        ));
        assert_eq!(
            parse_err("http://not.es/find?range=2015-03-03T09:35:00Z,2015-03-03T09:35:00Z"),
            QueryError::EmptyRange
        );
    }

    #[test]
    fn unknown_params_are_ignored() {
        assert!(parse("http://not.es/find?utm_source=feed").is_default());
    }

    #[test]
    fn params_round_trip() {
        let start = Utc.with_ymd_and_hms(2015, 3, 3, 9, 35, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2015, 3, 9, 10, 50, 0).unwrap();
        let query = Query::builder()
            .find("title", "hello world")
            .start(2)
            .count(5)
            .match_field("content", "rust")
            .match_field("id", "4")
            .range(start, end)
            .sort_by("title")
            .reverse()
            .build()
            .unwrap();

        let params = to_params(&query);
        assert_eq!(from_params(params).unwrap(), query);
    }

    #[test]
    fn default_params_name_sort_and_reverse() {
        let params = to_params(&Query::default());
        assert_eq!(
            params,
            vec![
                ("sort".to_string(), "created".to_string()),
                ("reverse".to_string(), "false".to_string()),
            ]
        );
    }
}
