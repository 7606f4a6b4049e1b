//! Pre-navigation authorization check
//!
//! A pure decision over the target's metadata and the current staff role.
//! `None` for the role means no staff identity is logged in.

use super::routes::RouteMeta;
use crate::auth::StaffRole;
use crate::constants::{ROUTE_LOGIN, ROUTE_TEACHER_HOME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectTo(String),
}

impl RouteDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }

    fn redirect(route: &str) -> Self {
        RouteDecision::RedirectTo(route.to_string())
    }
}

/// Rules are evaluated in order, first match wins:
/// 1. auth required, nobody logged in: login
/// 2. admin required, role is not admin: teacher home
/// 3. teacher required, role neither teacher nor admin: login
/// 4. guest-only, somebody logged in: that role's home
pub fn evaluate(meta: &RouteMeta, current: Option<StaffRole>) -> RouteDecision {
    if meta.requires_auth && current.is_none() {
        return RouteDecision::redirect(ROUTE_LOGIN);
    }

    match meta.role {
        Some(StaffRole::Admin) if current != Some(StaffRole::Admin) => {
            return RouteDecision::redirect(ROUTE_TEACHER_HOME);
        }
        Some(StaffRole::Teacher)
            if !current.is_some_and(|role| role.satisfies(StaffRole::Teacher)) =>
        {
            return RouteDecision::redirect(ROUTE_LOGIN);
        }
        _ => {}
    }

    if meta.guest_only {
        if let Some(role) = current {
            return RouteDecision::redirect(role.home_route());
        }
    }

    RouteDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ROUTE_ADMIN_HOME;

    const ROLES: [Option<StaffRole>; 3] = [None, Some(StaffRole::Teacher), Some(StaffRole::Admin)];

    #[test]
    fn test_unauthenticated_always_goes_to_login() {
        for role in [None, Some(StaffRole::Admin), Some(StaffRole::Teacher)] {
            let meta = RouteMeta {
                requires_auth: true,
                role,
                guest_only: false,
            };
            assert_eq!(evaluate(&meta, None), RouteDecision::redirect(ROUTE_LOGIN));
        }
    }

    #[test]
    fn test_non_admin_steps_down_to_teacher_home() {
        let meta = RouteMeta::for_role(StaffRole::Admin);
        assert_eq!(
            evaluate(&meta, Some(StaffRole::Teacher)),
            RouteDecision::redirect(ROUTE_TEACHER_HOME)
        );
        assert_eq!(evaluate(&meta, Some(StaffRole::Admin)), RouteDecision::Allow);
    }

    #[test]
    fn test_admin_may_open_teacher_routes() {
        let meta = RouteMeta::for_role(StaffRole::Teacher);
        assert_eq!(evaluate(&meta, Some(StaffRole::Admin)), RouteDecision::Allow);
        assert_eq!(evaluate(&meta, Some(StaffRole::Teacher)), RouteDecision::Allow);
    }

    #[test]
    fn test_role_without_auth_flag() {
        let admin_only = RouteMeta {
            requires_auth: false,
            role: Some(StaffRole::Admin),
            guest_only: false,
        };
        assert_eq!(evaluate(&admin_only, None), RouteDecision::redirect(ROUTE_TEACHER_HOME));

        let teacher_only = RouteMeta {
            requires_auth: false,
            role: Some(StaffRole::Teacher),
            guest_only: false,
        };
        assert_eq!(evaluate(&teacher_only, None), RouteDecision::redirect(ROUTE_LOGIN));
    }

    #[test]
    fn test_guests_only_routes_send_staff_home() {
        let meta = RouteMeta::guest_only();
        assert_eq!(evaluate(&meta, None), RouteDecision::Allow);
        assert_eq!(
            evaluate(&meta, Some(StaffRole::Admin)),
            RouteDecision::redirect(ROUTE_ADMIN_HOME)
        );
        assert_eq!(
            evaluate(&meta, Some(StaffRole::Teacher)),
            RouteDecision::redirect(ROUTE_TEACHER_HOME)
        );
    }

    #[test]
    fn test_public_routes_allow_everyone() {
        for role in ROLES {
            assert_eq!(evaluate(&RouteMeta::public(), role), RouteDecision::Allow);
            assert_eq!(evaluate(&RouteMeta::authenticated(), role).is_allow(), role.is_some());
        }
    }
}
