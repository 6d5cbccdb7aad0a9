use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    SingleTitle,
    PrefixSearch,
    AllDiscounted,
    TitleList,
    /// Title list that is only worth delivering when something is on sale.
    Watchlist,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleTitle => "single-title",
            Self::PrefixSearch => "prefix-search",
            Self::AllDiscounted => "all-discounted",
            Self::TitleList => "title-list",
            Self::Watchlist => "watchlist",
        }
    }

    pub fn requires_argument(&self) -> bool {
        matches!(self, Self::SingleTitle | Self::PrefixSearch | Self::TitleList)
    }

    /// Maps the short `type` tag used by hosted-function requests.
    /// Unknown or missing tags fall back to the watchlist.
    pub fn from_request_tag(tag: Option<&str>) -> Self {
        match tag.map(|tag| tag.trim().to_ascii_lowercase()).as_deref() {
            Some("t") => Self::SingleTitle,
            Some("s") => Self::PrefixSearch,
            Some("a") => Self::AllDiscounted,
            Some("l") | Some("onsale") => Self::TitleList,
            _ => Self::Watchlist,
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single-title" => Ok(Self::SingleTitle),
            "prefix-search" | "multi-search" => Ok(Self::PrefixSearch),
            "all-discounted" => Ok(Self::AllDiscounted),
            "title-list" | "comma-list" => Ok(Self::TitleList),
            "watchlist" => Ok(Self::Watchlist),
            other => Err(DomainError::UnknownQueryMode(other.to_owned())),
        }
    }
}

/// One resolved request. Built at the invocation boundary and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub mode: QueryMode,
    pub argument: String,
}

impl Query {
    pub fn new(mode: QueryMode, argument: impl Into<String>) -> Result<Self, DomainError> {
        let argument = argument.into();
        if mode.requires_argument() && argument.trim().is_empty() {
            return Err(DomainError::MissingQueryArgument(mode));
        }
        Ok(Self { mode, argument })
    }

    pub fn single_title(title: impl Into<String>) -> Self {
        Self { mode: QueryMode::SingleTitle, argument: title.into() }
    }

    pub fn prefix_search(prefix: impl Into<String>) -> Self {
        Self { mode: QueryMode::PrefixSearch, argument: prefix.into() }
    }

    pub fn all_discounted() -> Self {
        Self { mode: QueryMode::AllDiscounted, argument: String::new() }
    }

    pub fn title_list(titles: impl Into<String>) -> Self {
        Self { mode: QueryMode::TitleList, argument: titles.into() }
    }

    /// An empty argument means "use the configured watchlist".
    pub fn watchlist(titles: impl Into<String>) -> Self {
        Self { mode: QueryMode::Watchlist, argument: titles.into() }
    }

    /// Comma-separated titles of the argument, trimmed, blanks dropped.
    pub fn titles(&self) -> Vec<String> {
        split_titles(&self.argument)
    }
}

pub fn split_titles(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|title| !title.is_empty()).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::{Query, QueryMode};
    use crate::errors::DomainError;

    #[test]
    fn titles_are_split_trimmed_and_blank_free() {
        let query = Query::title_list(" zelda, ,mario kart ,metroid,");
        assert_eq!(query.titles(), vec!["zelda", "mario kart", "metroid"]);
    }

    #[test]
    fn new_rejects_missing_argument_for_title_modes() {
        assert_eq!(
            Query::new(QueryMode::SingleTitle, "  "),
            Err(DomainError::MissingQueryArgument(QueryMode::SingleTitle))
        );
        assert!(Query::new(QueryMode::AllDiscounted, "").is_ok());
        assert!(Query::new(QueryMode::Watchlist, "").is_ok());
    }

    #[test]
    fn request_tags_follow_hosted_encoding() {
        assert_eq!(QueryMode::from_request_tag(Some("s")), QueryMode::PrefixSearch);
        assert_eq!(QueryMode::from_request_tag(Some("t")), QueryMode::SingleTitle);
        assert_eq!(QueryMode::from_request_tag(Some("a")), QueryMode::AllDiscounted);
        assert_eq!(QueryMode::from_request_tag(Some("onsale")), QueryMode::TitleList);
        assert_eq!(QueryMode::from_request_tag(None), QueryMode::Watchlist);
        assert_eq!(QueryMode::from_request_tag(Some("bogus")), QueryMode::Watchlist);
    }

    #[test]
    fn cli_mode_names_parse() {
        assert_eq!("multi-search".parse::<QueryMode>(), Ok(QueryMode::PrefixSearch));
        assert_eq!("comma-list".parse::<QueryMode>(), Ok(QueryMode::TitleList));
        assert!("everything".parse::<QueryMode>().is_err());
    }
}
