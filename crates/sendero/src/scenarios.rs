//! Built-in journeys against the OrangeHRM demo application.

use crate::config::Credentials;
use crate::journey::{JourneyConfig, Login};
use crate::locator::Locators;
use crate::pattern::UrlPattern;
use crate::step::Step;
use crate::wait::{WaitCondition, ACTION_TIMEOUT_MS, PAGE_LOAD_TIMEOUT_MS};

/// Public OrangeHRM demo
pub const DEMO_URL: &str = "https://opensource-demo.orangehrmlive.com/";

/// Employee created by the built-in `pim_add_employee` journey
pub const DEFAULT_EMPLOYEE: (&str, &str) = ("Akshay", "Tester");

/// The demo's published login
#[must_use]
pub fn demo_credentials() -> Credentials {
    Credentials::new("Admin", "admin123")
}

/// A built-in scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    /// Name, also the artifact file stem
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Overall deadline
    pub deadline_ms: u64,
}

/// Every built-in scenario
pub const BUILTINS: [Builtin; 3] = [
    Builtin {
        name: "login",
        description: "Log in and confirm the user menu appears",
        deadline_ms: 60_000,
    },
    Builtin {
        name: "admin",
        description: "Open the Admin module and wait for the user table",
        deadline_ms: 120_000,
    },
    Builtin {
        name: "pim_add_employee",
        description: "Add an employee in PIM and land on their personal details",
        deadline_ms: 90_000,
    },
];

/// Look up a built-in scenario by name, rooted at `base_url`
#[must_use]
pub fn builtin(name: &str, base_url: &str) -> Option<JourneyConfig> {
    match name {
        "login" => Some(login(base_url)),
        "admin" => Some(admin(base_url)),
        "pim_add_employee" => Some(add_employee(base_url, DEFAULT_EMPLOYEE.0, DEFAULT_EMPLOYEE.1)),
        _ => None,
    }
}

mod ui {
    use crate::locator::Locator;

    pub fn username() -> Locator {
        Locator::attribute("username", "input", "name", "username")
    }
    pub fn password() -> Locator {
        Locator::attribute("password", "input", "name", "password")
    }
    pub fn login_button() -> Locator {
        Locator::attribute("login_button", "button", "type", "submit")
    }
    pub fn profile_menu() -> Locator {
        Locator::class("profile_menu", Some("span"), "oxd-userdropdown-tab")
    }
    pub fn admin_menu() -> Locator {
        Locator::attribute_contains("admin_menu", "a", "href", "viewAdminModule")
    }
    pub fn admin_table() -> Locator {
        Locator::class("admin_table", None, "oxd-table-header")
    }
    pub fn pim_menu() -> Locator {
        Locator::attribute_contains("pim_menu", "a", "href", "viewPimModule")
    }
    pub fn add_button() -> Locator {
        Locator::role("add_button", "button", "Add")
    }
    pub fn first_name() -> Locator {
        Locator::attribute("first_name", "input", "name", "firstName")
    }
    pub fn last_name() -> Locator {
        Locator::attribute("last_name", "input", "name", "lastName")
    }
    pub fn save_button() -> Locator {
        Locator::role("save_button", "button", "Save")
    }
    pub fn side_panel() -> Locator {
        Locator::class("side_panel", None, "oxd-sidepanel")
    }
}

/// Named targets of the OrangeHRM UI
#[must_use]
pub fn targets() -> Locators {
    let mut targets = Locators::new();
    for locator in [
        ui::username(),
        ui::password(),
        ui::login_button(),
        ui::profile_menu(),
        ui::admin_menu(),
        ui::admin_table(),
        ui::pim_menu(),
        ui::add_button(),
        ui::first_name(),
        ui::last_name(),
        ui::save_button(),
        ui::side_panel(),
    ] {
        targets.insert(locator);
    }
    targets
}

/// Username/password form confirmed by the user dropdown
#[must_use]
pub fn login_section() -> Login {
    Login {
        steps: vec![
            Step::expect_visible(ui::username(), PAGE_LOAD_TIMEOUT_MS),
            Step::fill(ui::username(), crate::config::USERNAME_PLACEHOLDER),
            Step::fill_secret(ui::password(), crate::config::PASSWORD_PLACEHOLDER),
            Step::click(ui::login_button()),
        ],
        marker: WaitCondition::visible(ui::profile_menu(), ACTION_TIMEOUT_MS),
    }
}

fn base(name: &str, base_url: &str, deadline_ms: u64) -> JourneyConfig {
    JourneyConfig::new(name, base_url)
        .with_login(login_section())
        .with_overall_timeout_ms(deadline_ms)
}

/// Login only
#[must_use]
pub fn login(base_url: &str) -> JourneyConfig {
    base("login", base_url, BUILTINS[0].deadline_ms)
}

/// Admin module user table
#[must_use]
pub fn admin(base_url: &str) -> JourneyConfig {
    base("admin", base_url, BUILTINS[1].deadline_ms)
        .step(Step::click(ui::admin_menu()))
        .step(Step::expect_visible(ui::admin_table(), ACTION_TIMEOUT_MS))
}

/// Create employee `first last` through PIM
#[must_use]
pub fn add_employee(base_url: &str, first: &str, last: &str) -> JourneyConfig {
    base("pim_add_employee", base_url, BUILTINS[2].deadline_ms)
        .step(Step::click(ui::pim_menu()))
        .step(Step::expect_visible(ui::add_button(), ACTION_TIMEOUT_MS))
        .step(Step::click(ui::add_button()))
        .step(Step::expect_visible(ui::first_name(), ACTION_TIMEOUT_MS))
        .step(Step::fill(ui::first_name(), first))
        .step(Step::fill(ui::last_name(), last))
        .step(Step::click(ui::save_button()))
        .step(Step::wait(WaitCondition::url(
            UrlPattern::glob("**/pim/viewPersonalDetails/**"),
            ACTION_TIMEOUT_MS,
        )))
        .step(Step::expect_visible(ui::side_panel(), PAGE_LOAD_TIMEOUT_MS))
}
