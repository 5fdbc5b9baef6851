//! Rule catalog.
//!
//! Every diagnostic carries one [`RuleCode`]. The code owns the rule's
//! kebab-case name, one-line description, default severity, default message
//! template and documentation link, so checks only decide *when* a rule fires.

use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// Identifier of a lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleCode {
    /// `DEBUG = True`.
    Sec01,
    /// Hardcoded `SECRET_KEY`.
    Sec02,
    /// Empty `ALLOWED_HOSTS`.
    Sec03,
    /// Wildcard in `ALLOWED_HOSTS`.
    Sec04,
    /// `CSRF_COOKIE_SECURE = False`.
    Sec05,
    /// `SESSION_COOKIE_SECURE = False`.
    Sec06,
    /// `SECURE_SSL_REDIRECT = False`.
    Sec07,
    /// Invalid `X_FRAME_OPTIONS` value.
    Sec08,
    /// Clickjacking middleware missing.
    Sec09,
    /// `SECURE_HSTS_SECONDS = 0`.
    Sec10,
    /// HSTS subdomains flag without effect.
    Sec11,
    /// HSTS subdomains disabled.
    Sec12,
    /// `.raw()` SQL query.
    Sec13,
    /// `connection.cursor()` SQL access.
    Sec14,
    /// Overly complex view.
    Cmp01,
    /// View without exception handling.
    Cdq01,
    /// Name too short.
    Cdq02,
    /// Function name without a verb.
    Cdq03,
    /// Function body too long.
    Cdq04,
    /// Model field convention.
    Cdq11,
    /// Redundant queryset method chain.
    Cdq14,
    /// Boolean variable prefix.
    Sty01,
    /// Boolean variable positive naming.
    Sty02,
    /// Boolean property prefix.
    Sty03,
    /// Boolean property positive naming.
    Sty04,
}

impl RuleCode {
    /// Every rule, in catalog order.
    pub const ALL: [Self; 25] = [
        Self::Sec01,
        Self::Sec02,
        Self::Sec03,
        Self::Sec04,
        Self::Sec05,
        Self::Sec06,
        Self::Sec07,
        Self::Sec08,
        Self::Sec09,
        Self::Sec10,
        Self::Sec11,
        Self::Sec12,
        Self::Sec13,
        Self::Sec14,
        Self::Cmp01,
        Self::Cdq01,
        Self::Cdq02,
        Self::Cdq03,
        Self::Cdq04,
        Self::Cdq11,
        Self::Cdq14,
        Self::Sty01,
        Self::Sty02,
        Self::Sty03,
        Self::Sty04,
    ];

    /// Returns the rule code (e.g., "SEC01").
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sec01 => "SEC01",
            Self::Sec02 => "SEC02",
            Self::Sec03 => "SEC03",
            Self::Sec04 => "SEC04",
            Self::Sec05 => "SEC05",
            Self::Sec06 => "SEC06",
            Self::Sec07 => "SEC07",
            Self::Sec08 => "SEC08",
            Self::Sec09 => "SEC09",
            Self::Sec10 => "SEC10",
            Self::Sec11 => "SEC11",
            Self::Sec12 => "SEC12",
            Self::Sec13 => "SEC13",
            Self::Sec14 => "SEC14",
            Self::Cmp01 => "CMP01",
            Self::Cdq01 => "CDQ01",
            Self::Cdq02 => "CDQ02",
            Self::Cdq03 => "CDQ03",
            Self::Cdq04 => "CDQ04",
            Self::Cdq11 => "CDQ11",
            Self::Cdq14 => "CDQ14",
            Self::Sty01 => "STY01",
            Self::Sty02 => "STY02",
            Self::Sty03 => "STY03",
            Self::Sty04 => "STY04",
        }
    }

    /// Returns the kebab-case name of this rule (e.g., "debug-true").
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sec01 => "debug-true",
            Self::Sec02 => "hardcoded-secret-key",
            Self::Sec03 => "empty-allowed-hosts",
            Self::Sec04 => "wildcard-allowed-hosts",
            Self::Sec05 => "csrf-cookie-insecure",
            Self::Sec06 => "session-cookie-insecure",
            Self::Sec07 => "ssl-redirect-disabled",
            Self::Sec08 => "x-frame-options-invalid",
            Self::Sec09 => "x-frame-options-missing-middleware",
            Self::Sec10 => "hsts-seconds-zero",
            Self::Sec11 => "hsts-subdomains-ignored",
            Self::Sec12 => "hsts-subdomains-disabled",
            Self::Sec13 => "raw-sql",
            Self::Sec14 => "raw-sql-cursor",
            Self::Cmp01 => "complex-view",
            Self::Cdq01 => "missing-exception-handling",
            Self::Cdq02 => "name-too-short",
            Self::Cdq03 => "function-name-no-verb",
            Self::Cdq04 => "function-too-long",
            Self::Cdq11 => "model-field-convention",
            Self::Cdq14 => "redundant-query-chain",
            Self::Sty01 => "boolean-variable-prefix",
            Self::Sty02 => "boolean-variable-positive-naming",
            Self::Sty03 => "boolean-property-prefix",
            Self::Sty04 => "boolean-property-positive-naming",
        }
    }

    /// Returns a brief description of what this rule checks.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Sec01 => "DEBUG must be False in production",
            Self::Sec02 => "SECRET_KEY should be read from the environment",
            Self::Sec03 => "ALLOWED_HOSTS must not be empty",
            Self::Sec04 => "ALLOWED_HOSTS must not contain '*'",
            Self::Sec05 => "CSRF_COOKIE_SECURE should be True",
            Self::Sec06 => "SESSION_COOKIE_SECURE should be True",
            Self::Sec07 => "SECURE_SSL_REDIRECT should be True",
            Self::Sec08 => "X_FRAME_OPTIONS should be DENY or SAMEORIGIN",
            Self::Sec09 => "XFrameOptionsMiddleware should be in MIDDLEWARE",
            Self::Sec10 => "SECURE_HSTS_SECONDS should be positive",
            Self::Sec11 => "SECURE_HSTS_INCLUDE_SUBDOMAINS has no effect without HSTS",
            Self::Sec12 => "SECURE_HSTS_INCLUDE_SUBDOMAINS should be True",
            Self::Sec13 => "Avoid raw() SQL queries",
            Self::Sec14 => "Avoid connection.cursor() SQL access",
            Self::Cmp01 => "Identifies overly complex views",
            Self::Cdq01 => "Views should handle exceptions",
            Self::Cdq02 => "Names should be at least 3 characters long",
            Self::Cdq03 => "Function names should start with a verb",
            Self::Cdq04 => "Functions should not exceed the configured length",
            Self::Cdq11 => "Model fields should follow Django conventions",
            Self::Cdq14 => "Identifies redundant QuerySet method chains",
            Self::Sty01 => "Boolean variables should use a configured prefix",
            Self::Sty02 => "Boolean variables should use positive naming",
            Self::Sty03 => "Boolean object properties should use a configured prefix",
            Self::Sty04 => "Boolean object properties should use positive naming",
        }
    }

    /// Returns the default severity for issues from this rule.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::Sec13 | Self::Sec14 | Self::Cdq01 | Self::Cdq14 => Severity::Information,
            _ => Severity::Warning,
        }
    }

    /// Returns the default message template.
    ///
    /// Placeholders are written as `{key}` and filled from issue parameters.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::Sec01 => "DEBUG is set to True. Ensure it is False in production.",
            Self::Sec02 => "SECRET_KEY appears to be hardcoded. It is strongly recommended to store it in an environment variable.",
            Self::Sec03 => "ALLOWED_HOSTS is empty. This is not secure for production.",
            Self::Sec04 => "ALLOWED_HOSTS contains a wildcard '*'. This is not recommended for production.",
            Self::Sec05 => "CSRF_COOKIE_SECURE is False. Set this to True to avoid transmitting the CSRF cookie over HTTP accidentally.",
            Self::Sec06 => "SESSION_COOKIE_SECURE is False. Set this to True to avoid transmitting the session cookie over HTTP accidentally.",
            Self::Sec07 => "SECURE_SSL_REDIRECT is set to False. It should be True in production to enforce HTTPS.",
            Self::Sec08 => "X_FRAME_OPTIONS is not set to a valid value. It should be either 'DENY' or 'SAMEORIGIN' to prevent clickjacking.",
            Self::Sec09 => "X_FRAME_OPTIONS is set, but the XFrameOptionsMiddleware is missing from the MIDDLEWARE list.",
            Self::Sec10 => "SECURE_HSTS_SECONDS is set to 0. Set it to a positive value to enforce HTTPS.",
            Self::Sec11 => "SECURE_HSTS_INCLUDE_SUBDOMAINS is True, but it has no effect because SECURE_HSTS_SECONDS is 0.",
            Self::Sec12 => "SECURE_HSTS_INCLUDE_SUBDOMAINS is set to False. Set it to True for better security.",
            Self::Sec13 => "Avoid using 'raw' queries to execute SQL directly, bypassing Django's ORM protections.",
            Self::Sec14 => "Avoid using 'connection.cursor()' to execute SQL directly, bypassing Django's ORM protections.",
            Self::Cmp01 => concat!(
                "\"{name}\" seems overly complex with {line_count} lines and {operation_count} operations.\n\n",
                "Consider breaking it up and refactoring the business logic using one of the following approaches:\n\n",
                "- Fat Models: Encapsulate logic in model methods.\n\n",
                "- Service Layer: Move complex workflows into service classes.",
            ),
            Self::Cdq01 => concat!(
                "\"{name}\" does not contain any exception handling.\n\n",
                "Consider adding try-except blocks to handle potential errors and improve the robustness of your code.",
            ),
            Self::Cdq02 => "Name '{name}' is too short.",
            Self::Cdq03 => "Function name '{name}' should start with a verb.",
            Self::Cdq04 => "Function '{name}' is too long. Limit is {limit} lines.",
            Self::Cdq11 => "ModelFieldIssue: '{field}' does not follow model field conventions.",
            Self::Cdq14 => concat!(
                "Redundant QuerySet method chain detected: \"{method_chain}\"\n\n",
                "The current chain of methods is unnecessary because the final method \"{simplified_chain}\" already provides the desired result.\n\n",
                "Consider replacing \"{method_chain}\" with \"{simplified_chain}\"\n\n",
                "Simplified queries avoid redundant operations, resulting in cleaner and easier-to-maintain code.",
            ),
            Self::Sty01 => "Boolean variable '{name}' should have a proper prefix.",
            Self::Sty02 => "Boolean variable '{name}' should not have a negative pattern.",
            Self::Sty03 => "Boolean property '{name}' should have a proper prefix.",
            Self::Sty04 => "Boolean property '{name}' should not have a negative pattern.",
        }
    }

    /// Returns the reference documentation for this rule, if any.
    #[must_use]
    pub fn doc_link(self) -> Option<&'static str> {
        let link = match self {
            Self::Sec01 => "https://docs.djangoproject.com/en/5.0/howto/deployment/checklist/#debug",
            Self::Sec02 => "https://docs.djangoproject.com/en/5.0/howto/deployment/checklist/#secret-key",
            Self::Sec03 | Self::Sec04 => {
                "https://docs.djangoproject.com/en/5.0/howto/deployment/checklist/#allowed-hosts"
            }
            Self::Sec05 => {
                "https://docs.djangoproject.com/en/5.0/howto/deployment/checklist/#csrf-cookie-secure"
            }
            Self::Sec06 => {
                "https://docs.djangoproject.com/en/5.0/howto/deployment/checklist/#session-cookie-secure"
            }
            Self::Sec07 => "https://docs.djangoproject.com/en/5.0/ref/settings/#secure-ssl-redirect",
            Self::Sec08 | Self::Sec09 => "https://docs.djangoproject.com/en/5.0/ref/clickjacking/",
            Self::Sec10 | Self::Sec11 => {
                "https://docs.djangoproject.com/en/5.0/ref/settings/#secure-hsts-seconds"
            }
            Self::Sec12 => {
                "https://docs.djangoproject.com/en/5.0/ref/settings/#secure-hsts-include-subdomains"
            }
            Self::Sec13 | Self::Sec14 => {
                "https://docs.djangoproject.com/en/5.0/topics/security/#sql-injection-protection"
            }
            Self::Cdq14 => "https://docs.djangoproject.com/en/5.0/ref/models/querysets/",
            _ => return None,
        };
        Some(link)
    }

    /// Looks a rule up by its code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_round_trip() {
        for rule in RuleCode::ALL {
            assert_eq!(RuleCode::from_code(rule.as_str()), Some(rule));
        }
        assert_eq!(RuleCode::from_code("sec01"), Some(RuleCode::Sec01));
        assert_eq!(RuleCode::from_code("AL001"), None);
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&RuleCode::Cdq14).unwrap();
        assert_eq!(json, "\"CDQ14\"");
    }

    #[test]
    fn informational_rules() {
        assert_eq!(RuleCode::Sec13.default_severity(), Severity::Information);
        assert_eq!(RuleCode::Cdq01.default_severity(), Severity::Information);
        assert_eq!(RuleCode::Sec01.default_severity(), Severity::Warning);
    }

    #[test]
    fn doc_links_point_at_django_docs() {
        let link = RuleCode::Sec01.doc_link().unwrap();
        assert!(link.starts_with("https://docs.djangoproject.com/"));
        assert!(link.ends_with("#debug"));
        assert_eq!(
            RuleCode::Cdq14.doc_link(),
            Some("https://docs.djangoproject.com/en/5.0/ref/models/querysets/")
        );
        assert!(RuleCode::Cdq02.doc_link().is_none());
    }
}
