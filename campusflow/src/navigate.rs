//! Dashboard pages and the `navigate` tool used by voice commands.

use std::fmt::{Display, Formatter};

use cschema::{Field, ObjectSchema};
use ctooling::{ToolError, ToolRegistry, ToolSpec, required_string};
use serde_json::json;

pub const NAVIGATE: &str = "navigate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardPage {
    Dashboard,
    Students,
    Teachers,
    Classes,
    Attendance,
    Fees,
    Billing,
    Notifications,
    Reports,
    Settings,
}

impl DashboardPage {
    pub const ALL: [DashboardPage; 10] = [
        Self::Dashboard,
        Self::Students,
        Self::Teachers,
        Self::Classes,
        Self::Attendance,
        Self::Fees,
        Self::Billing,
        Self::Notifications,
        Self::Reports,
        Self::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Classes => "classes",
            Self::Attendance => "attendance",
            Self::Fees => "fees",
            Self::Billing => "billing",
            Self::Notifications => "notifications",
            Self::Reports => "reports",
            Self::Settings => "settings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|page| page.as_str().eq_ignore_ascii_case(value))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Students => "Students",
            Self::Teachers => "Teachers",
            Self::Classes => "Classes",
            Self::Attendance => "Attendance",
            Self::Fees => "Fees",
            Self::Billing => "Billing",
            Self::Notifications => "Notifications",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
        }
    }

    pub fn path(self) -> String {
        match self {
            Self::Dashboard => "/dashboard".to_string(),
            page => format!("/dashboard/{}", page.as_str()),
        }
    }
}

impl Display for DashboardPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn navigate_spec() -> ToolSpec {
    ToolSpec::new(NAVIGATE, "Open a page of the school dashboard.")
        .with_input(
            ObjectSchema::builder()
                .field(
                    Field::enumeration("page", DashboardPage::ALL.map(DashboardPage::as_str))
                        .describe("Dashboard page to open"),
                )
                .build(),
        )
        .with_output(
            ObjectSchema::builder()
                .field(Field::enumeration(
                    "page",
                    DashboardPage::ALL.map(DashboardPage::as_str),
                ))
                .field(Field::string("label"))
                .field(Field::string("path"))
                .build(),
        )
}

pub fn register_navigation_tool(registry: &mut ToolRegistry) {
    registry.register_sync_fn(navigate_spec(), |input, _context| {
        let requested = required_string(&input, "page")?;
        let page = DashboardPage::parse(&requested)
            .ok_or_else(|| ToolError::input_invalid(format!("unknown page '{requested}'")))?;

        Ok(json!({
            "page": page.as_str(),
            "label": page.label(),
            "path": page.path(),
        }))
    });
}

#[cfg(test)]
mod tests {
    use ctooling::{ToolErrorKind, ToolExecutionContext};

    use super::*;

    #[test]
    fn pages_round_trip_through_names() {
        for page in DashboardPage::ALL {
            assert_eq!(DashboardPage::parse(page.as_str()), Some(page));
        }
        assert_eq!(DashboardPage::parse(" Fees "), Some(DashboardPage::Fees));
        assert_eq!(DashboardPage::parse("cafeteria"), None);
    }

    #[test]
    fn paths_nest_under_dashboard() {
        assert_eq!(DashboardPage::Dashboard.path(), "/dashboard");
        assert_eq!(DashboardPage::Attendance.path(), "/dashboard/attendance");
    }

    #[tokio::test]
    async fn navigate_tool_resolves_page() {
        let mut registry = ToolRegistry::new();
        register_navigation_tool(&mut registry);

        let output = registry
            .invoke(
                NAVIGATE,
                &json!({"page": "students"}),
                &ToolExecutionContext::new("inv-nav"),
            )
            .await
            .expect("navigation should succeed");

        assert_eq!(
            output,
            json!({"page": "students", "label": "Students", "path": "/dashboard/students"})
        );

        let error = registry
            .invoke(
                NAVIGATE,
                &json!({"page": "cafeteria"}),
                &ToolExecutionContext::new("inv-nav"),
            )
            .await
            .expect_err("unknown page should fail");
        assert_eq!(error.kind, ToolErrorKind::InputInvalid);
    }
}
