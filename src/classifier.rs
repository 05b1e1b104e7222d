// src/classifier.rs
// URL-shape rules deciding which pages get the overlay

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{InjectError, Result};

/// Uncompiled rule: a pattern, plus an optional pattern that vetoes a match.
///
/// The `regex` crate has no lookaround, so "match `/read/` but not
/// `/read/pcpreview`" is written as a pattern and an exclusion.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub name: &'static str,
    pub pattern: &'static str,
    pub exclude: Option<&'static str>,
}

const fn rule(name: &'static str, pattern: &'static str) -> RuleSpec {
    RuleSpec { name, pattern, exclude: None }
}

const fn rule_except(name: &'static str, pattern: &'static str, exclude: &'static str) -> RuleSpec {
    RuleSpec { name, pattern, exclude: Some(exclude) }
}

/// Shapes of the site's home URL
pub const HOME_PAGE_RULES: &[RuleSpec] = &[
    rule("home", r"^https?://(?:www\.)?bilibili\.com/?(?:#/?)?$"),
    rule("home-index", r"^https?://(?:www\.)?bilibili\.com/index\.html$"),
    rule("home-tracking", r"^https?://(?:www\.)?bilibili\.com/\?spm_id_from="),
];

/// Every other page shape the overlay supports
pub const SUPPORTED_PAGE_RULES: &[RuleSpec] = &[
    // shared links land on the root with a bvid query
    rule("shared-video", r"^https?://www\.bilibili\.com/\?bvid="),
    rule("video", r"https?://(?:www\.)?bilibili\.com/(?:video|list)/"),
    rule("bangumi", r"https?://(?:www\.)?bilibili\.com/bangumi/play/"),
    rule("watch-later-playlist", r"https?://(?:www\.)?bilibili\.com/list/watchlater"),
    rule("favorite-playlist", r"https?://(?:www\.)?bilibili\.com/list/ml"),
    rule("search", r"https?://search\.bilibili\.com"),
    rule("moments", r"https?://t\.bilibili\.com"),
    rule("moment-detail", r"https?://(?:www\.)?bilibili\.com/opus/"),
    rule("history", r"https?://(?:www\.)?bilibili\.com/account/history"),
    rule("watch-later", r"https?://(?:www\.)?bilibili\.com/watchlater/#/list"),
    rule("user-space", r"https?://space\.bilibili\.com"),
    rule("notifications", r"https?://message\.bilibili\.com"),
    rule_except(
        "channel",
        r"https?://(?:www\.)?bilibili\.com/v/",
        r"https?://(?:www\.)?bilibili\.com/v/popular",
    ),
    rule("anime", r"https?://(?:www\.)?bilibili\.com/(?:anime|guochuang)"),
    rule(
        "channel-family",
        r"https?://(?:www\.)?bilibili\.com/(?:tv|movie|variety|mooc|documentary)",
    ),
    // the column preview page has a layout the overlay cannot adapt to
    rule_except(
        "article",
        r"https?://(?:www\.)?bilibili\.com/read/",
        r"https?://(?:www\.)?bilibili\.com/read/pcpreview",
    ),
    rule("not-found", r"^https?://(?:www\.)?bilibili\.com/404"),
    rule("creative-center", r"^https?://member\.bilibili\.com/platform"),
    rule("account-settings", r"^https?://account\.bilibili\.com/"),
    rule("login", r"^https?://passport\.bilibili\.com/login"),
];

/// A compiled rule
#[derive(Debug, Clone)]
pub struct PageRule {
    name: &'static str,
    pattern: Regex,
    exclude: Option<Regex>,
}

impl PageRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let build = |pattern: &str| {
            Regex::new(pattern).map_err(|source| InjectError::Rule { name: spec.name, source })
        };
        Ok(Self {
            name: spec.name,
            pattern: build(spec.pattern)?,
            exclude: spec.exclude.map(build).transpose()?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url) && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(url))
    }
}

/// What the classifier concluded about one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub eligible: bool,
    pub home: bool,
    /// Name of the first rule that matched
    pub rule: Option<&'static str>,
}

impl Classification {
    pub const INELIGIBLE: Self = Self { eligible: false, home: false, rule: None };
}

/// Ordered rule sets for home and supported pages.
///
/// A URL is eligible when any rule matches; order only decides which rule
/// name gets reported.
#[derive(Debug, Clone)]
pub struct PageClassifier {
    home: Vec<PageRule>,
    supported: Vec<PageRule>,
}

static BUILTIN: LazyLock<PageClassifier> = LazyLock::new(|| {
    PageClassifier::new(HOME_PAGE_RULES, SUPPORTED_PAGE_RULES).expect("built-in page rules compile")
});

impl PageClassifier {
    pub fn new(home: &[RuleSpec], supported: &[RuleSpec]) -> Result<Self> {
        Ok(Self {
            home: home.iter().map(PageRule::compile).collect::<Result<_>>()?,
            supported: supported.iter().map(PageRule::compile).collect::<Result<_>>()?,
        })
    }

    /// Classifier over the built-in rule tables
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn is_home_page(&self, url: &str) -> bool {
        self.home.iter().any(|r| r.matches(url))
    }

    pub fn is_eligible(&self, url: &str) -> bool {
        self.classify(url).eligible
    }

    pub fn classify(&self, url: &str) -> Classification {
        if let Some(hit) = self.home.iter().find(|r| r.matches(url)) {
            return Classification { eligible: true, home: true, rule: Some(hit.name) };
        }
        match self.supported.iter().find(|r| r.matches(url)) {
            Some(hit) => Classification { eligible: true, home: false, rule: Some(hit.name) },
            None => Classification::INELIGIBLE,
        }
    }
}
