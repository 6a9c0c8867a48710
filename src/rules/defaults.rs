//! Protective default rules.
//!
//! Every rule here is a keep-variant with UNKNOWN as the non-matching
//! fallback. On their own they never cause a deletion; they only rescue
//! files that other rules would delete.

use super::primitives::{BuiltinRule, PathPattern};
use super::NamedRule;

/// How a default rule matches.
enum Matcher {
    Regex(&'static str),
    Substring(&'static str),
}

/// (label, matcher) in evaluation order.
const DEFAULTS: &[(&str, Matcher)] = &[
    ("keep: /lib/ (system)", Matcher::Regex("/lib/")),
    ("keep: /bin/ (system)", Matcher::Regex("/bin/")),
    ("keep: /sbin/ (system)", Matcher::Regex("/sbin/")),
    ("keep: /boot/ (system)", Matcher::Regex("/boot/")),
    ("keep: .keep (directory marker)", Matcher::Regex(r"/\.keep$")),
    ("keep: /tmp/ (system)", Matcher::Regex("^/tmp/")),
    ("keep: /.svn/ (version control)", Matcher::Substring("/.svn/")),
    ("keep: /.git/ (version control)", Matcher::Substring("/.git/")),
    ("keep: /.bzr/ (version control)", Matcher::Substring("/.bzr/")),
    ("keep: /.hg/ (version control)", Matcher::Substring("/.hg/")),
    ("keep: .xmp (sidecar metadata)", Matcher::Regex("[.]xmp$")),
    ("keep: .ifo (sidecar metadata)", Matcher::Regex("[.]ifo$")),
    ("keep: Picasa.ini (sidecar metadata)", Matcher::Regex("/Picasa[.]ini$")),
    ("keep: /[Bb]ackup (user backups)", Matcher::Regex("/[Bb]ackup")),
    ("keep: /[Aa]rchive (user archives)", Matcher::Regex("/[Aa]rchive")),
];

/// The default rule list, in evaluation order.
#[must_use]
pub fn default_rules() -> Vec<NamedRule> {
    DEFAULTS
        .iter()
        .filter_map(|(label, matcher)| {
            let pattern = match matcher {
                Matcher::Substring(s) => PathPattern::substring(*s),
                Matcher::Regex(r) => match PathPattern::regex(r) {
                    Ok(p) => p,
                    Err(e) => {
                        log::error!("Dropping default rule '{}': {}", label, e);
                        return None;
                    }
                },
            };
            Some(NamedRule::new(*label, BuiltinRule::KeepMatching(pattern)))
        })
        .collect()
}
