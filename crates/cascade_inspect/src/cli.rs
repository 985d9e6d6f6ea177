//! Command line parsing for the `cascade_inspect` binary.

use anyhow::{Context as _, Result, anyhow, bail};
use css_inspector::AnalysisRequest;

/// Usage line printed on bad arguments.
pub const USAGE: &str =
    "usage: cascade_inspect <url> <selector> [--properties=a,b] [--pseudo] | --request=<json>";

/// Build an [`AnalysisRequest`] from arguments (program name excluded).
///
/// `--request=<json>` takes the camelCase request document verbatim; otherwise the first two
/// positional arguments are the URL and the selector.
///
/// # Errors
/// Returns an error for unknown flags, missing positionals or malformed JSON.
pub fn parse_args<I>(args: I) -> Result<AnalysisRequest>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut properties = None;
    let mut pseudo = false;
    for arg in args {
        if let Some(json) = arg.strip_prefix("--request=") {
            return serde_json::from_str(json).context("malformed --request document");
        }
        if let Some(list) = arg.strip_prefix("--properties=") {
            let names: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
            properties = Some(names);
            continue;
        }
        if arg == "--pseudo" || arg == "--pseudo-states" {
            pseudo = true;
            continue;
        }
        if arg.starts_with("--") {
            bail!("unknown flag `{arg}`\n{USAGE}");
        }
        positional.push(arg);
    }

    let mut positional = positional.into_iter();
    let (Some(url), Some(selector)) = (positional.next(), positional.next()) else {
        return Err(anyhow!("expected a url and a selector\n{USAGE}"));
    };
    if let Some(extra) = positional.next() {
        bail!("unexpected argument `{extra}`\n{USAGE}");
    }
    let mut request = AnalysisRequest::new(url, selector).with_pseudo_states(pseudo);
    request.properties = properties;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|&arg| arg.to_owned()).collect()
    }

    #[test]
    fn positional_with_flags() -> Result<()> {
        let request = parse_args(args(&[
            "https://x.test/",
            "#hero",
            "--properties=color, font-size",
            "--pseudo",
        ]))?;
        assert_eq!(request.url, "https://x.test/");
        assert_eq!(request.selector, "#hero");
        assert_eq!(
            request.properties,
            Some(vec!["color".to_owned(), "font-size".to_owned()])
        );
        assert!(request.include_pseudo_states);
        Ok(())
    }

    #[test]
    fn request_document_is_used_verbatim() -> Result<()> {
        let request = parse_args(args(&[
            r#"--request={"url":"https://x.test/","selector":".a","properties":["color"]}"#,
        ]))?;
        assert_eq!(request.selector, ".a");
        assert!(!request.include_pseudo_states);
        Ok(())
    }

    #[test]
    fn missing_selector_and_unknown_flags_fail() {
        assert!(parse_args(args(&["https://x.test/"])).is_err());
        assert!(parse_args(args(&["https://x.test/", "p", "--verbose"])).is_err());
    }
}
