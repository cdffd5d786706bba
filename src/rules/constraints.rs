//! Built-in validation rules.
//!
//! Ordering rules (`min`, `max`, `len`, `eq`, `ne`, `gt`, `gte`, `lt`, `lte`)
//! compare numbers by value, text by character count, lists by length and
//! durations against a duration parameter. An unset `Option` passes every
//! rule except `required`.

use std::cmp::Ordering;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use crate::duration::parse_duration;
use crate::leaf::Value;

use super::{RuleError, Rules, Verdict, require_param};

pub(super) fn register(rules: &mut Rules) {
    use Ordering::{Equal, Greater, Less};

    rules.add_validation("required", required);
    rules.add_validation("min", ordering_rule("min", &[Greater, Equal], "at least"));
    rules.add_validation("max", ordering_rule("max", &[Less, Equal], "at most"));
    rules.add_validation("len", ordering_rule("len", &[Equal], "exactly"));
    rules.add_validation("eq", ordering_rule("eq", &[Equal], "equal to"));
    rules.add_validation("ne", ordering_rule("ne", &[Less, Greater], "different from"));
    rules.add_validation("gt", ordering_rule("gt", &[Greater], "greater than"));
    rules.add_validation("gte", ordering_rule("gte", &[Greater, Equal], "at least"));
    rules.add_validation("lt", ordering_rule("lt", &[Less], "less than"));
    rules.add_validation("lte", ordering_rule("lte", &[Less, Equal], "at most"));
    rules.add_validation("oneof", one_of);
    rules.add_validation(
        "ip",
        text_rule("ip", "a valid IP address", |s| s.parse::<IpAddr>().is_ok()),
    );
    rules.add_validation(
        "ipv4",
        text_rule("ipv4", "a valid IPv4 address", |s| s.parse::<Ipv4Addr>().is_ok()),
    );
    rules.add_validation(
        "ipv6",
        text_rule("ipv6", "a valid IPv6 address", |s| s.parse::<Ipv6Addr>().is_ok()),
    );
    rules.add_validation(
        "hostname_port",
        text_rule("hostname_port", "a host:port pair", is_host_port),
    );
    rules.add_validation(
        "alphanum",
        text_rule("alphanum", "alphanumeric", |s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
        }),
    );
    rules.add_validation(
        "numeric",
        text_rule("numeric", "numeric", |s| {
            s.parse::<f64>().is_ok() && !s.contains(|c: char| c.is_ascii_alphabetic())
        }),
    );
}

fn required(value: &Value<'_>, _param: Option<&str>) -> Result<Verdict, RuleError> {
    Ok(Verdict::check(!value.is_zero(), || "is required".into()))
}

/// What an ordering rule measures on a value.
enum Measure {
    Number(f64),
    Integer(i128),
    Length(usize),
    Span(Duration),
    Flag(bool),
}

fn measure(value: &Value<'_>) -> Option<Measure> {
    Some(match value {
        Value::Int(i) => Measure::Integer(*i),
        Value::Float(f) => Measure::Number(*f),
        Value::Text(s) => Measure::Length(s.chars().count()),
        Value::List(n) => Measure::Length(*n),
        Value::Duration(d) => Measure::Span(*d),
        Value::Bool(b) => Measure::Flag(*b),
        Value::Absent => return None,
    })
}

fn compare(rule: &str, value: &Value<'_>, param: &str) -> Result<Option<Ordering>, RuleError> {
    let bad_param = |expected: &str| {
        RuleError::new(format!("'{rule}={param}' needs {expected} parameter"))
    };

    // eq/ne on text compare the text itself, not its length.
    if matches!(rule, "eq" | "ne")
        && let Value::Text(s) = value
    {
        let text: &str = s;
        return Ok(Some(text.cmp(param)));
    }

    let Some(measure) = measure(value) else {
        return Ok(None);
    };
    let ordering = match measure {
        Measure::Integer(i) => match param.parse::<i128>() {
            Ok(limit) => Some(i.cmp(&limit)),
            Err(_) => {
                let limit: f64 = param.parse().map_err(|_| bad_param("a numeric"))?;
                (i as f64).partial_cmp(&limit)
            }
        },
        Measure::Number(n) => {
            let limit: f64 = param.parse().map_err(|_| bad_param("a numeric"))?;
            n.partial_cmp(&limit)
        }
        Measure::Length(n) => {
            let limit: usize = param.parse().map_err(|_| bad_param("a non-negative integer"))?;
            Some(n.cmp(&limit))
        }
        Measure::Span(d) => {
            let limit = parse_duration(param).map_err(|_| bad_param("a duration"))?;
            Some(d.cmp(&limit))
        }
        Measure::Flag(b) if matches!(rule, "eq" | "ne") => {
            let limit: bool = param.parse().map_err(|_| bad_param("a boolean"))?;
            Some(b.cmp(&limit))
        }
        Measure::Flag(_) => {
            return Err(RuleError::new(format!("'{rule}' does not apply to this field")));
        }
    };
    Ok(ordering)
}

fn ordering_rule(
    rule: &'static str,
    accepted: &'static [Ordering],
    phrase: &'static str,
) -> impl Fn(&Value<'_>, Option<&str>) -> Result<Verdict, RuleError> + Send + Sync {
    move |value: &Value<'_>, param: Option<&str>| {
        let param = require_param(rule, param)?;
        let Some(ordering) = compare(rule, value, param)? else {
            // Unset optional, or NaN.
            return Ok(Verdict::Pass);
        };
        Ok(Verdict::check(accepted.contains(&ordering), || {
            describe(value, phrase, param)
        }))
    }
}

fn describe(value: &Value<'_>, phrase: &str, param: &str) -> String {
    match value {
        Value::Text(_) if matches!(phrase, "equal to" | "different from") => {
            format!("must be {phrase} '{param}'")
        }
        Value::Text(_) => format!("length must be {phrase} {param} characters"),
        Value::List(_) => format!("must contain {phrase} {param} items"),
        _ => format!("must be {phrase} {param}"),
    }
}

/// `oneof=a b c`: the value must equal one of the space-separated options.
fn one_of(value: &Value<'_>, param: Option<&str>) -> Result<Verdict, RuleError> {
    let param = require_param("oneof", param)?;
    let options: Vec<&str> = param.split_whitespace().collect();
    let found = match value {
        Value::Absent => return Ok(Verdict::Pass),
        Value::Text(s) => {
            let text: &str = s;
            options.contains(&text)
        }
        Value::Int(i) => options.iter().any(|o| o.parse::<i128>().ok() == Some(*i)),
        Value::Float(f) => options.iter().any(|o| o.parse::<f64>().ok() == Some(*f)),
        _ => return Err(RuleError::new("'oneof' applies to text and numbers")),
    };
    Ok(Verdict::check(found, || {
        format!("must be one of [{}]", options.join(", "))
    }))
}

fn text_rule(
    rule: &'static str,
    expected: &'static str,
    accept: fn(&str) -> bool,
) -> impl Fn(&Value<'_>, Option<&str>) -> Result<Verdict, RuleError> + Send + Sync {
    move |value: &Value<'_>, _param: Option<&str>| match value {
        Value::Absent => Ok(Verdict::Pass),
        Value::Text(s) => Ok(Verdict::check(accept(s), || format!("must be {expected}"))),
        _ => Err(RuleError::new(format!("'{rule}' applies to text fields"))),
    }
}

fn is_host_port(s: &str) -> bool {
    let Some((host, port)) = s.rsplit_once(':') else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    port.parse::<u16>().is_ok()
        && (host.is_empty()
            || host.parse::<IpAddr>().is_ok()
            || host.split('.').all(is_host_label))
}

fn is_host_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
