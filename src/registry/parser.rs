// ABOUTME: Parses a subagent record - YAML frontmatter plus a prompt body.
// ABOUTME: Separates corrupt records (abort the load) from invalid ones (skip).

use serde::Deserialize;

use super::config::SubagentConfig;
use crate::domain::Domain;
use crate::error::{ConfigError, RegistryError};

const FRONTMATTER_DELIM: &str = "---";

#[derive(Debug, Deserialize)]
struct Frontmatter {
    name: Option<String>,
    description: Option<String>,
    model: Option<String>,
    tools: Option<ToolList>,
    domain: Option<String>,
}

/// `tools` may be a YAML list or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolList {
    List(Vec<String>),
    Csv(String),
}

impl ToolList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ToolList::List(tools) => tools,
            ToolList::Csv(tools) => tools.split(',').map(|t| t.trim().to_string()).collect(),
        }
    }
}

/// Parse one record into a validated [`SubagentConfig`].
///
/// The outer `Result` fails only when the frontmatter is not YAML at all;
/// the inner one carries per-record validation failures. `domain_hint` is
/// used when the frontmatter has no `domain` key.
pub fn parse_record(
    record: &str,
    contents: &str,
    domain_hint: Option<Domain>,
) -> Result<Result<SubagentConfig, ConfigError>, RegistryError> {
    let Some((raw, body)) = split_frontmatter(contents) else {
        return Ok(Err(ConfigError::MissingFrontmatter {
            record: record.to_string(),
        }));
    };

    let frontmatter: Frontmatter = if raw.trim().is_empty() {
        Frontmatter {
            name: None,
            description: None,
            model: None,
            tools: None,
            domain: None,
        }
    } else {
        serde_yaml::from_str(raw).map_err(|source| RegistryError::Corrupt {
            record: record.to_string(),
            source,
        })?
    };

    let domain = match frontmatter.domain.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => match value.parse::<Domain>() {
            Ok(domain) => domain,
            Err(unknown) => {
                return Ok(Err(ConfigError::UnknownDomain {
                    record: record.to_string(),
                    domain: unknown,
                }));
            }
        },
        _ => domain_hint.unwrap_or(Domain::General),
    };

    let config = SubagentConfig::new(
        frontmatter.name.unwrap_or_default().trim(),
        body.trim(),
    )
    .description(frontmatter.description.unwrap_or_default().trim())
    .model(frontmatter.model.unwrap_or_default().trim())
    .tools(frontmatter.tools.map(ToolList::into_vec).unwrap_or_default())
    .domain(domain)
    .source_path(record);

    Ok(config.validate().map(|()| config))
}

fn split_frontmatter(contents: &str) -> Option<(&str, &str)> {
    let trimmed = contents.trim_start_matches('\u{feff}').trim_start();
    let rest = trimmed.strip_prefix(FRONTMATTER_DELIM)?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;

    if let Some(idx) = rest.find("\n---") {
        let frontmatter = &rest[..idx];
        let body = &rest[idx + 4..];
        let body = body.strip_prefix('\r').unwrap_or(body);
        let body = body.strip_prefix('\n').unwrap_or(body);
        Some((frontmatter, body))
    } else if rest.starts_with(FRONTMATTER_DELIM) {
        let body = &rest[FRONTMATTER_DELIM.len()..];
        Some(("", body))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_frontmatter_and_body() {
        let doc = "---\nname: front-desk\ndescription: Hotel front desk\nmodel: claude-sonnet-4-20250514\ntools: [get_document, create_document]\ndomain: hospitality\n---\nYou run the front desk.\n";
        let config = parse_record("front-desk.md", doc, None).unwrap().unwrap();

        assert_eq!(config.name, "front-desk");
        assert_eq!(config.domain, Domain::Hospitality);
        assert_eq!(config.allowed_tools, vec!["get_document", "create_document"]);
        assert_eq!(config.system_prompt, "You run the front desk.");
        assert_eq!(config.source_path, "front-desk.md");
    }

    #[test]
    fn test_comma_separated_tools_and_domain_hint() {
        let doc = "---\nname: grader\ndescription: Grades\nmodel: m\ntools: get_document, run_report\n---\nGrade things.";
        let config = parse_record("education/grader.md", doc, Some(Domain::Education))
            .unwrap()
            .unwrap();

        assert_eq!(config.allowed_tools, vec!["get_document", "run_report"]);
        assert_eq!(config.domain, Domain::Education);
    }

    #[test]
    fn test_missing_body_is_invalid() {
        let doc = "---\nname: empty\ndescription: d\nmodel: m\ntools: [a]\n---\n";
        let err = parse_record("empty.md", doc, None).unwrap().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "system_prompt", .. }));
    }

    #[test]
    fn test_no_frontmatter_is_invalid() {
        let err = parse_record("plain.md", "just a prompt", None)
            .unwrap()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingFrontmatter {
                record: "plain.md".into()
            }
        );
    }

    #[test]
    fn test_unknown_domain_is_invalid() {
        let doc = "---\nname: pilot\ndescription: d\nmodel: m\ntools: [a]\ndomain: aviation\n---\nFly.";
        let err = parse_record("pilot.md", doc, None).unwrap().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDomain { domain, .. } if domain == "aviation"));
    }

    #[test]
    fn test_unparseable_yaml_is_corrupt() {
        let doc = "---\nname: [unclosed\ntools: {\n---\nBody";
        let err = parse_record("broken.md", doc, None).unwrap_err();
        assert!(matches!(err, RegistryError::Corrupt { record, .. } if record == "broken.md"));
    }
}
