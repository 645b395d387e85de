//! Canonical alias derivation for flags and options.
//!
//! An alias is the `-`/`--` prefixed token that refers to a parameter on the
//! command line. Short aliases are a single dash followed by exactly one
//! character (`-v`); long aliases are two dashes followed by two or more
//! characters (`--verbose`). No other form is an alias.

use tracing::warn;

use crate::error::{ConfigurationError, ResolutionWarning, Result};

/// Whether an alias is the short or the long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// `-x`
    Short,
    /// `--name`
    Long,
}

impl AliasKind {
    /// Classifies a prefixed alias string by its prefix.
    ///
    /// Returns `None` for strings that are not well-formed aliases, such as
    /// `-verbose`, `--v`, or a bare `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdar_core::AliasKind;
    ///
    /// assert_eq!(AliasKind::of("-v"), Some(AliasKind::Short));
    /// assert_eq!(AliasKind::of("--verbose"), Some(AliasKind::Long));
    /// assert_eq!(AliasKind::of("-verbose"), None);
    /// assert_eq!(AliasKind::of("--v"), None);
    /// ```
    pub fn of(alias: &str) -> Option<Self> {
        if let Some(rest) = alias.strip_prefix("--") {
            return (rest.chars().count() >= 2 && !rest.starts_with('-')).then_some(Self::Long);
        }
        let rest = alias.strip_prefix('-')?;
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '-' => Some(Self::Short),
            _ => None,
        }
    }

    /// Prefixes a bare name with the dashes matching its length.
    fn prefix(bare: &str) -> String {
        if bare.chars().count() == 1 {
            format!("-{bare}")
        } else {
            format!("--{bare}")
        }
    }
}

/// How to derive the aliases of a flag or option.
///
/// Both `create_*_if_absent` switches default to `true`, so a bare
/// declaration named `verbose` yields `-v` and `--verbose`.
///
/// # Examples
///
/// ```
/// use cmdar_core::AliasSpec;
///
/// let spec = AliasSpec::new()
///     .short('o')
///     .long("out")
///     .alias("file");
/// assert_eq!(spec.short_name.as_deref(), Some("o"));
/// assert!(spec.create_long_if_absent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSpec {
    /// Explicit short name, without the dash. Must be one character.
    pub short_name: Option<String>,
    /// Explicit long name, without the dashes. Must be two or more characters.
    pub long_name: Option<String>,
    /// Extra names, without dashes, in declaration order.
    pub other_aliases: Vec<String>,
    /// Derive `-<first char of name>` when no short name is given.
    pub create_short_if_absent: bool,
    /// Derive `--<name>` when no long name is given.
    pub create_long_if_absent: bool,
}

impl Default for AliasSpec {
    fn default() -> Self {
        Self {
            short_name: None,
            long_name: None,
            other_aliases: Vec::new(),
            create_short_if_absent: true,
            create_long_if_absent: true,
        }
    }
}

impl AliasSpec {
    /// Creates a spec that derives both aliases from the parameter name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit short name.
    pub fn short(mut self, short: char) -> Self {
        self.short_name = Some(short.to_string());
        self
    }

    /// Sets the explicit long name.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long_name = Some(long.into());
        self
    }

    /// Appends an extra alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.other_aliases.push(alias.into());
        self
    }

    /// Replaces the extra aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.other_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Disables deriving a short alias from the name.
    pub fn no_derived_short(mut self) -> Self {
        self.create_short_if_absent = false;
        self
    }

    /// Disables deriving a long alias from the name.
    pub fn no_derived_long(mut self) -> Self {
        self.create_long_if_absent = false;
        self
    }
}

/// Ordered, deduplicated set of canonical aliases.
///
/// Built once when a flag or option is declared and immutable afterwards.
/// Always non-empty.
///
/// # Examples
///
/// ```
/// use cmdar_core::{AliasSet, AliasSpec};
///
/// let set = AliasSet::new("verbose", &AliasSpec::new()).unwrap();
/// assert_eq!(set.as_slice(), ["-v", "--verbose"]);
///
/// let set = AliasSet::new(
///     "output",
///     &AliasSpec::new().short('o').long("out").alias("file"),
/// )
/// .unwrap();
/// assert_eq!(set.as_slice(), ["-o", "--out", "--file"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    aliases: Vec<String>,
    warnings: Vec<ResolutionWarning>,
}

impl AliasSet {
    /// Derives the alias set of the parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the name is empty, a short name
    /// is not exactly one character, a long name is shorter than two
    /// characters, an entry already carries a dash prefix, or no alias could
    /// be derived at all.
    pub fn new(name: &str, spec: &AliasSpec) -> Result<Self> {
        check_name(name)?;

        let mut candidates = Vec::new();
        let mut warnings = Vec::new();

        if let Some(short) = &spec.short_name {
            check_name(short)?;
            if short.chars().count() != 1 {
                return Err(ConfigurationError::InvalidShortName(short.clone()));
            }
            candidates.push(format!("-{short}"));
        } else if spec.create_short_if_absent {
            // check_name guarantees a first character
            let first: String = name.chars().take(1).collect();
            candidates.push(format!("-{first}"));
        }

        if let Some(long) = &spec.long_name {
            check_name(long)?;
            if long.chars().count() < 2 {
                return Err(ConfigurationError::InvalidLongName(long.clone()));
            }
            candidates.push(format!("--{long}"));
        } else if spec.create_long_if_absent {
            candidates.push(AliasKind::prefix(name));
        }

        for alias in &spec.other_aliases {
            if alias.is_empty() {
                warn!(parameter = name, "skipped an empty alias");
                warnings.push(ResolutionWarning::EmptyAlias {
                    parameter: name.to_string(),
                });
                continue;
            }
            check_name(alias)?;
            candidates.push(AliasKind::prefix(alias));
        }

        let mut aliases: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !aliases.contains(&candidate) {
                aliases.push(candidate);
            }
        }

        if aliases.is_empty() {
            return Err(ConfigurationError::EmptyAliasSet(name.to_string()));
        }

        Ok(Self { aliases, warnings })
    }

    /// All aliases in declaration order.
    pub fn as_slice(&self) -> &[String] {
        &self.aliases
    }

    /// Iterates over all aliases in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    /// Returns `true` if `token` is one of the aliases.
    pub fn contains(&self, token: &str) -> bool {
        self.aliases.iter().any(|alias| alias == token)
    }

    /// Short aliases in declaration order.
    pub fn short_aliases(&self) -> impl Iterator<Item = &str> {
        self.of_kind(AliasKind::Short)
    }

    /// Long aliases in declaration order.
    pub fn long_aliases(&self) -> impl Iterator<Item = &str> {
        self.of_kind(AliasKind::Long)
    }

    /// First short alias, if any.
    pub fn primary_short(&self) -> Option<&str> {
        self.short_aliases().next()
    }

    /// First long alias, if any.
    pub fn primary_long(&self) -> Option<&str> {
        self.long_aliases().next()
    }

    /// First short and first long alias, in the order they were declared.
    ///
    /// Scanning stops as soon as one of each kind was seen, so the result
    /// holds one or two aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdar_core::{AliasSet, AliasSpec};
    ///
    /// let spec = AliasSpec::new().long("lon").aliases(["aczs", "d", "asca"]).no_derived_short();
    /// let set = AliasSet::new("x", &spec).unwrap();
    /// assert_eq!(set.primaries(), vec!["--lon", "-d"]);
    /// ```
    pub fn primaries(&self) -> Vec<&str> {
        let mut primaries = Vec::with_capacity(2);
        let mut seen_short = false;
        let mut seen_long = false;

        for alias in self.iter() {
            if seen_short && seen_long {
                break;
            }
            let seen = match AliasKind::of(alias) {
                Some(AliasKind::Short) => &mut seen_short,
                Some(AliasKind::Long) => &mut seen_long,
                None => continue,
            };
            if !*seen {
                *seen = true;
                primaries.push(alias);
            }
        }

        primaries
    }

    /// Warnings raised while deriving the set, such as skipped empty entries.
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    fn of_kind(&self, kind: AliasKind) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |alias| AliasKind::of(alias) == Some(kind))
    }
}

/// Rejects empty names and names that would not survive prefixing.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigurationError::EmptyName);
    }
    if name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(ConfigurationError::InvalidName(name.to_string()));
    }
    Ok(())
}
