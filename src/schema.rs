//! Typed shapes for the queryable record kinds: site metadata, post
//! frontmatter, and the fields derived for a post after it is created. Every
//! field is optional so that a site with no posts, or a post that omits a key,
//! is a valid state rather than an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Site-wide metadata from the `site` section of the project file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// The `author_id` of the site's primary author.
    #[serde(default)]
    pub author: Option<String>,

    /// The public root URL of the site.
    #[serde(default)]
    pub site_url: Option<Url>,
}

/// The YAML metadata at the head of a post source file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// The publication date. Only used to order posts.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDateTime>,

    /// Foreign key into the author catalog. Not validated.
    #[serde(default)]
    pub author_id: Option<String>,
}

/// Fields attached to a post by the create-node hook.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostFields {
    #[serde(default)]
    pub slug: Option<String>,
}

/// Fields attached to an image by the create-node hook.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    #[serde(default)]
    pub author_id: Option<String>,
}

/// Parses a date in one of the accepted frontmatter formats: a bare date
/// (`2020-01-01`), a date and time without offset (`2020-01-01T08:30:00`), or
/// RFC 3339. Times with offsets are normalized to UTC.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|datetime| datetime.naive_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date `{}`", s))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frontmatter_all_fields_optional() -> Result<(), serde_yaml::Error> {
        let frontmatter: Frontmatter = serde_yaml::from_str("{}")?;
        assert_eq!(Frontmatter::default(), frontmatter);
        Ok(())
    }

    #[test]
    fn test_frontmatter_camel_case_keys() -> Result<(), serde_yaml::Error> {
        let frontmatter: Frontmatter = serde_yaml::from_str(
            "title: Hello\ndate: 2020-06-01\nauthorId: joshj\n",
        )?;
        assert_eq!(Some("Hello".to_owned()), frontmatter.title);
        assert_eq!(Some("joshj".to_owned()), frontmatter.author_id);
        assert_eq!(parse_date("2020-06-01"), frontmatter.date);
        Ok(())
    }

    #[test]
    fn test_frontmatter_rejects_garbage_date() {
        assert!(serde_yaml::from_str::<Frontmatter>("date: not-a-date\n").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = NaiveDate::from_ymd_opt(2020, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(midnight, parse_date("2020-03-01"));
        assert_eq!(midnight, parse_date("2020-03-01T00:00:00"));
        assert_eq!(midnight, parse_date("2020-03-01T02:00:00+02:00"));
        assert_eq!(midnight, parse_date("2020-03-01T00:00:00.000Z"));
        assert_eq!(None, parse_date("March 1st"));
    }

    #[test]
    fn test_site_metadata_defaults() -> Result<(), serde_yaml::Error> {
        let site: SiteMetadata = serde_yaml::from_str("{}")?;
        assert_eq!(None, site.author);
        assert_eq!(None, site.site_url);
        Ok(())
    }
}
