//! Version and version-range value objects.
//!
//! Versions are compared component by component: release numbers
//! numerically (missing components count as zero, so `1.0 == 1.0.0`),
//! then the suffix phase: development releases, then pre-releases, then
//! the release itself, then post-releases
//! (`1.0.0.dev1 < 1.0.0a1 < 1.0.0-rc.1 < 1.0.0 < 1.0.0.post1`).

use crate::shared::error::ImpactError;
use crate::shared::EngineResult;
use std::cmp::Ordering;
use std::fmt;

const OPERATOR_CHARS: &str = "<>=!~^";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PreIdentifier {
    Numeric(u64),
    Alpha(String),
}

impl fmt::Display for PreIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreIdentifier::Numeric(n) => write!(f, "{}", n),
            PreIdentifier::Alpha(s) => f.write_str(s),
        }
    }
}

/// Where a suffix places a version relative to its bare release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Development,
    PreRelease,
    Release,
    Post,
}

/// A parsed concrete version such as `1.2.3`, `2.31`, `1.0.0-beta.2` or `1.0.0rc1`.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    release: Vec<u64>,
    pre: Vec<PreIdentifier>,
    text: String,
}

impl ParsedVersion {
    /// Parses a version string.
    ///
    /// A leading `v` and any `+build` metadata are ignored. Pre-release text
    /// may follow a `-` or be attached to a release component (`1.0.0rc1`).
    pub fn parse(input: &str) -> EngineResult<Self> {
        let trimmed = input.trim();
        let without_prefix = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
        let core = without_prefix.split('+').next().unwrap_or_default();
        if core.is_empty() {
            return Err(ImpactError::invalid_version(input, "empty version"));
        }

        let (release_part, dashed_pre) = match core.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (core, None),
        };

        let components: Vec<&str> = release_part.split('.').collect();
        let mut release = Vec::with_capacity(components.len());
        let mut pre_text = dashed_pre.map(str::to_string);

        for (idx, component) in components.iter().enumerate() {
            if component.is_empty() {
                return Err(ImpactError::invalid_version(input, "empty version component"));
            }

            let digits = component.bytes().take_while(u8::is_ascii_digit).count();
            if digits == component.len() {
                release.push(parse_number(input, component)?);
                continue;
            }

            if dashed_pre.is_some() || (digits == 0 && release.is_empty()) {
                return Err(ImpactError::invalid_version(
                    input,
                    format!("unexpected component '{}'", component),
                ));
            }

            if digits > 0 {
                release.push(parse_number(input, &component[..digits])?);
            }
            let mut suffix = vec![&component[digits..]];
            suffix.extend_from_slice(&components[idx + 1..]);
            pre_text = Some(suffix.join("."));
            break;
        }

        let pre = match pre_text {
            Some(text) => parse_pre_release(input, &text)?,
            None => Vec::new(),
        };

        Ok(Self {
            release,
            pre,
            text: trimmed.to_string(),
        })
    }

    fn from_release(release: Vec<u64>) -> Self {
        let text = release
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            release,
            pre: Vec::new(),
            text,
        }
    }

    /// Development and pre-releases; post-releases are not.
    pub fn is_prerelease(&self) -> bool {
        self.phase() < Phase::Release
    }

    fn phase(&self) -> Phase {
        match self.pre.first() {
            None => Phase::Release,
            Some(PreIdentifier::Alpha(tag)) => match tag.as_str() {
                "dev" => Phase::Development,
                "post" | "rev" | "r" => Phase::Post,
                _ => Phase::PreRelease,
            },
            Some(PreIdentifier::Numeric(_)) => Phase::PreRelease,
        }
    }

    /// Release version with the component at `index` incremented and
    /// every later component reset to zero.
    fn bump_at(&self, index: usize) -> Self {
        let mut release = self.release.clone();
        if release.len() <= index {
            release.resize(index + 1, 0);
        }
        release[index] = release[index].saturating_add(1);
        for component in release.iter_mut().skip(index + 1) {
            *component = 0;
        }
        Self::from_release(release)
    }

    /// Smallest release strictly above this version at its own precision:
    /// `1.2.3 -> 1.2.4`, `1.0.0-rc.1 -> 1.0.0`.
    fn next_release(&self) -> Self {
        if self.is_prerelease() {
            Self::from_release(self.release.clone())
        } else {
            self.bump_at(self.release.len().saturating_sub(1))
        }
    }

    fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }
}

fn parse_number(input: &str, digits: &str) -> EngineResult<u64> {
    digits
        .parse::<u64>()
        .map_err(|e| ImpactError::invalid_version(input, format!("'{}': {}", digits, e)))
}

fn parse_pre_release(input: &str, text: &str) -> EngineResult<Vec<PreIdentifier>> {
    let mut identifiers = Vec::new();
    for part in text.split(['.', '-', '_']) {
        if part.is_empty() {
            return Err(ImpactError::invalid_version(input, "empty pre-release identifier"));
        }
        if !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ImpactError::invalid_version(
                input,
                format!("invalid pre-release identifier '{}'", part),
            ));
        }

        // Split "rc10" into "rc", 10 so numeric parts compare numerically.
        let mut rest = part;
        while !rest.is_empty() {
            let numeric = rest.starts_with(|c: char| c.is_ascii_digit());
            let run = rest
                .find(|c: char| c.is_ascii_digit() != numeric)
                .unwrap_or(rest.len());
            let (head, tail) = rest.split_at(run);
            identifiers.push(if numeric {
                PreIdentifier::Numeric(parse_number(input, head)?)
            } else {
                PreIdentifier::Alpha(head.to_lowercase())
            });
            rest = tail;
        }
    }
    Ok(identifiers)
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for index in 0..len {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        self.phase()
            .cmp(&other.phase())
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A single primitive constraint. Caret, tilde and compatible-release
/// operators are desugared into a lower and an upper bound when parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparator {
    Any,
    Exact(ParsedVersion),
    NotEqual(ParsedVersion),
    Greater(ParsedVersion),
    GreaterOrEqual(ParsedVersion),
    Less(ParsedVersion),
    LessOrEqual(ParsedVersion),
    Prefix(Vec<u64>),
    NotPrefix(Vec<u64>),
}

impl Comparator {
    pub fn allows(&self, version: &ParsedVersion) -> bool {
        match self {
            Comparator::Any => true,
            Comparator::Exact(v) => version == v,
            Comparator::NotEqual(v) => version != v,
            Comparator::Greater(v) => version > v,
            Comparator::GreaterOrEqual(v) => version >= v,
            Comparator::Less(v) => version < v,
            Comparator::LessOrEqual(v) => version <= v,
            Comparator::Prefix(prefix) => prefix_matches(prefix, version),
            Comparator::NotPrefix(prefix) => !prefix_matches(prefix, version),
        }
    }

    /// The first version past this constraint's upper edge, if it has one.
    pub fn escape_version(&self) -> Option<ParsedVersion> {
        match self {
            Comparator::Less(v) => Some(v.clone()),
            Comparator::LessOrEqual(v) | Comparator::Exact(v) => Some(v.next_release()),
            Comparator::Prefix(prefix) if !prefix.is_empty() => {
                Some(ParsedVersion::from_release(prefix.clone()).bump_at(prefix.len() - 1))
            }
            _ => None,
        }
    }
}

fn prefix_matches(prefix: &[u64], version: &ParsedVersion) -> bool {
    prefix
        .iter()
        .enumerate()
        .all(|(index, expected)| version.component(index) == *expected)
}

/// An affected-version range expression.
///
/// Grammar: `||`-separated alternatives, each a conjunction of comparators
/// separated by commas and/or whitespace (`>=1.2.0,<2.0.0`, `>=1.2.0 <2.0.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    expression: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionRange {
    pub fn parse(expression: &str) -> EngineResult<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ImpactError::invalid_version(expression, "empty range expression"));
        }

        let mut alternatives = Vec::new();
        for alternative in trimmed.split("||") {
            let mut comparators = Vec::new();
            for clause in alternative.split(',') {
                comparators.extend(parse_clause(expression, clause)?);
            }
            alternatives.push(comparators);
        }

        Ok(Self {
            expression: trimmed.to_string(),
            alternatives,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn contains(&self, version: &ParsedVersion) -> bool {
        self.alternatives
            .iter()
            .any(|conjunction| conjunction.iter().all(|c| c.allows(version)))
    }

    /// Candidate versions that sit just past one of the range's upper bounds
    pub fn escape_versions(&self) -> impl Iterator<Item = ParsedVersion> + '_ {
        self.alternatives
            .iter()
            .flatten()
            .filter_map(Comparator::escape_version)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn parse_clause(expression: &str, clause: &str) -> EngineResult<Vec<Comparator>> {
    let mut rest = clause.trim_start();
    if rest.is_empty() {
        return Err(ImpactError::invalid_version(expression, "empty clause"));
    }

    let mut comparators = Vec::new();
    while !rest.is_empty() {
        let op_len = rest
            .find(|c: char| !OPERATOR_CHARS.contains(c))
            .unwrap_or(rest.len());
        let op = &rest[..op_len];
        rest = rest[op_len..].trim_start();

        let version_len = rest
            .find(|c: char| c.is_whitespace() || OPERATOR_CHARS.contains(c))
            .unwrap_or(rest.len());
        let version = &rest[..version_len];
        rest = rest[version_len..].trim_start();

        if version.is_empty() {
            return Err(ImpactError::invalid_version(
                expression,
                format!("operator '{}' has no version", op),
            ));
        }
        comparators.extend(build_comparators(expression, op, version)?);
    }
    Ok(comparators)
}

fn build_comparators(expression: &str, op: &str, version: &str) -> EngineResult<Vec<Comparator>> {
    let is_equality = matches!(op, "" | "=" | "==" | "===");

    if matches!(version, "*" | "x" | "X") {
        return if is_equality {
            Ok(vec![Comparator::Any])
        } else {
            Err(ImpactError::invalid_version(expression, "wildcard requires '=='"))
        };
    }

    if let Some(prefix) = version
        .strip_suffix(".*")
        .or_else(|| version.strip_suffix(".x"))
    {
        let numbers = prefix
            .split('.')
            .map(|part| parse_number(expression, part))
            .collect::<EngineResult<Vec<_>>>()?;
        return match op {
            _ if is_equality => Ok(vec![Comparator::Prefix(numbers)]),
            "!=" => Ok(vec![Comparator::NotPrefix(numbers)]),
            _ => Err(ImpactError::invalid_version(
                expression,
                format!("wildcard not allowed with '{}'", op),
            )),
        };
    }

    let parsed = ParsedVersion::parse(version)?;
    let comparators = match op {
        _ if is_equality => vec![Comparator::Exact(parsed)],
        "!=" => vec![Comparator::NotEqual(parsed)],
        ">" => vec![Comparator::Greater(parsed)],
        ">=" => vec![Comparator::GreaterOrEqual(parsed)],
        "<" => vec![Comparator::Less(parsed)],
        "<=" => vec![Comparator::LessOrEqual(parsed)],
        "~=" => {
            if parsed.release.len() < 2 {
                return Err(ImpactError::invalid_version(
                    expression,
                    "'~=' needs at least two release components",
                ));
            }
            let mut upper = parsed.release[..parsed.release.len() - 1].to_vec();
            let last = upper.len() - 1;
            upper[last] = upper[last].saturating_add(1);
            vec![
                Comparator::GreaterOrEqual(parsed),
                Comparator::Less(ParsedVersion::from_release(upper)),
            ]
        }
        "^" => {
            let index = parsed
                .release
                .iter()
                .position(|component| *component != 0)
                .unwrap_or(parsed.release.len() - 1);
            let upper = parsed.bump_at(index);
            vec![Comparator::GreaterOrEqual(parsed), Comparator::Less(upper)]
        }
        "~" => {
            let index = if parsed.release.len() >= 2 { 1 } else { 0 };
            let upper = parsed.bump_at(index);
            vec![Comparator::GreaterOrEqual(parsed), Comparator::Less(upper)]
        }
        _ => {
            return Err(ImpactError::invalid_version(
                expression,
                format!("unknown operator '{}'", op),
            ))
        }
    };
    Ok(comparators)
}
