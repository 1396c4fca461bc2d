// src/routes.rs
//! Dashboard routes the client navigates or redirects to

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    SignIn,
    SignUp,
    Dashboard,
    Resumes,
    ResumeEditor(String),
    CoverLetters,
    CoverLetterEditor(String),
    Jobs,
    JobDetail(String),
    Credits,
    Pricing,
    Billing,
    BillingSuccess,
    BillingCancel,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/signin".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Resumes => "/dashboard/resumes".to_string(),
            Route::ResumeEditor(id) => format!("/dashboard/resumes/{}", id),
            Route::CoverLetters => "/dashboard/cover-letters".to_string(),
            Route::CoverLetterEditor(id) => format!("/dashboard/cover-letters/{}", id),
            Route::Jobs => "/dashboard/jobs".to_string(),
            Route::JobDetail(id) => format!("/dashboard/jobs/{}", id),
            Route::Credits => "/dashboard/credits".to_string(),
            Route::Pricing => "/pricing".to_string(),
            Route::Billing => "/dashboard/billing".to_string(),
            Route::BillingSuccess => "/dashboard/billing/success".to_string(),
            Route::BillingCancel => "/dashboard/billing/cancel".to_string(),
        }
    }

    /// Parse a path back into a route. Unknown paths land on the dashboard.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(&['?', '#'][..]).next().unwrap_or("");
        let trimmed = trimmed.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["signin"] => Route::SignIn,
            ["signup"] => Route::SignUp,
            ["pricing"] => Route::Pricing,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", "resumes"] => Route::Resumes,
            ["dashboard", "resumes", id] => Route::ResumeEditor(id.to_string()),
            ["dashboard", "cover-letters"] => Route::CoverLetters,
            ["dashboard", "cover-letters", id] => Route::CoverLetterEditor(id.to_string()),
            ["dashboard", "jobs"] => Route::Jobs,
            ["dashboard", "jobs", id] => Route::JobDetail(id.to_string()),
            ["dashboard", "credits"] => Route::Credits,
            ["dashboard", "billing"] => Route::Billing,
            ["dashboard", "billing", "success"] => Route::BillingSuccess,
            ["dashboard", "billing", "cancel"] => Route::BillingCancel,
            _ => Route::Dashboard,
        }
    }

    /// Routes reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp | Route::Pricing)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inverts_path() {
        let routes = [
            Route::SignIn,
            Route::Dashboard,
            Route::ResumeEditor("r1".to_string()),
            Route::JobDetail("j9".to_string()),
            Route::BillingSuccess,
            Route::Pricing,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_parse_ignores_query_and_trailing_slash() {
        assert_eq!(
            Route::parse("/dashboard/billing/success/?session_id=cs_123"),
            Route::BillingSuccess
        );
    }

    #[test]
    fn test_unknown_path_falls_back_to_dashboard() {
        assert_eq!(Route::parse("/nowhere/at/all"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Dashboard);
    }
}
