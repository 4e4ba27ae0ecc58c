// ABOUTME: Parses `--action` arguments like `click:Engineering/Data` into chart interactions.
// ABOUTME: The syntax mirrors how Interaction values print.

use std::str::FromStr;

use deck_render::Interaction;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Unknown action '{0}' (expected hover, unhover, click, back, crumb, filter, sort, toggle or reset)")]
    UnknownVerb(String),

    #[error("Action '{0}' needs a target, e.g. '{0}:NAME'")]
    MissingTarget(String),

    #[error("Action '{0}' takes no target")]
    UnexpectedTarget(String),

    #[error("Breadcrumb index '{0}' is not a number")]
    BadIndex(String),
}

/// One parsed `--action` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action(pub Interaction);

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        // Keys may contain ':' themselves, only the first one separates
        let (verb, target) = match raw.split_once(':') {
            Some((verb, target)) => (verb, Some(target)),
            None => (raw, None),
        };
        let verb_lower = verb.to_ascii_lowercase();

        let needs = |target: Option<&str>| -> Result<String, ActionError> {
            match target {
                Some(t) if !t.is_empty() => Ok(t.to_string()),
                _ => Err(ActionError::MissingTarget(verb_lower.clone())),
            }
        };
        let bare = |interaction: Interaction| -> Result<Interaction, ActionError> {
            match target {
                None => Ok(interaction),
                Some(_) => Err(ActionError::UnexpectedTarget(verb_lower.clone())),
            }
        };

        let interaction = match verb_lower.as_str() {
            "hover" => Interaction::Hover(Some(needs(target)?)),
            "unhover" => bare(Interaction::Hover(None))?,
            "click" => Interaction::Click(needs(target)?),
            "back" => bare(Interaction::Back)?,
            "crumb" => {
                let index = needs(target)?;
                let index = index
                    .parse::<usize>()
                    .map_err(|_| ActionError::BadIndex(index.clone()))?;
                Interaction::Breadcrumb(index)
            }
            "filter" => Interaction::Filter(target.filter(|t| !t.is_empty()).map(str::to_string)),
            "sort" => Interaction::Sort(needs(target)?),
            "toggle" => Interaction::Toggle(needs(target)?),
            "reset" => bare(Interaction::Reset)?,
            _ => return Err(ActionError::UnknownVerb(verb.to_string())),
        };
        Ok(Action(interaction))
    }
}

pub fn parse_all(raw: &[String]) -> Result<Vec<Interaction>, ActionError> {
    raw.iter()
        .map(|r| r.parse::<Action>().map(|a| a.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Interaction, ActionError> {
        raw.parse::<Action>().map(|a| a.0)
    }

    #[test]
    fn parses_every_verb() {
        assert_eq!(parse("hover:Sales"), Ok(Interaction::Hover(Some("Sales".into()))));
        assert_eq!(parse("unhover"), Ok(Interaction::Hover(None)));
        assert_eq!(
            parse("click:Engineering/Data"),
            Ok(Interaction::Click("Engineering/Data".into()))
        );
        assert_eq!(parse("back"), Ok(Interaction::Back));
        assert_eq!(parse("crumb:2"), Ok(Interaction::Breadcrumb(2)));
        assert_eq!(parse("filter:critical"), Ok(Interaction::Filter(Some("critical".into()))));
        assert_eq!(parse("filter"), Ok(Interaction::Filter(None)));
        assert_eq!(parse("filter:"), Ok(Interaction::Filter(None)));
        assert_eq!(parse("sort:age"), Ok(Interaction::Sort("age".into())));
        assert_eq!(parse("toggle:band"), Ok(Interaction::Toggle("band".into())));
        assert_eq!(parse(" RESET "), Ok(Interaction::Reset));
    }

    #[test]
    fn only_first_colon_splits() {
        assert_eq!(parse("click:a:b"), Ok(Interaction::Click("a:b".into())));
    }

    #[test]
    fn round_trips_through_display() {
        for raw in ["hover:x", "unhover", "click:a/b", "back", "crumb:0", "filter", "reset"] {
            assert_eq!(parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn reports_bad_actions() {
        assert_eq!(parse("zoom:x"), Err(ActionError::UnknownVerb("zoom".into())));
        assert_eq!(parse("click"), Err(ActionError::MissingTarget("click".into())));
        assert_eq!(parse("sort:"), Err(ActionError::MissingTarget("sort".into())));
        assert_eq!(parse("back:1"), Err(ActionError::UnexpectedTarget("back".into())));
        assert_eq!(parse("crumb:two"), Err(ActionError::BadIndex("two".into())));
    }

    #[test]
    fn parse_all_stops_at_first_error() {
        let raw = vec!["click:a".to_string(), "bogus".to_string()];
        assert!(parse_all(&raw).is_err());
        let ok = vec!["click:a".to_string(), "back".to_string()];
        assert_eq!(parse_all(&ok).unwrap().len(), 2);
    }
}
