//! Static route declarations
//!
//! Each route carries the metadata the guard consults. The table is plain
//! configuration; the guard never mutates it.

use crate::auth::StaffRole;
use crate::constants::{ROUTE_ADMIN_HOME, ROUTE_LOGIN, ROUTE_TEACHER_HOME};

/// Access requirements declared by a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub role: Option<StaffRole>,
    pub guest_only: bool,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn guest_only() -> Self {
        Self {
            guest_only: true,
            ..Self::default()
        }
    }

    /// Authenticated route reserved for `role`
    pub fn for_role(role: StaffRole) -> Self {
        Self {
            requires_auth: true,
            role: Some(role),
            guest_only: false,
        }
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: String,
    /// Path pattern, `:name` segments match any single segment
    pub path: String,
    pub meta: RouteMeta,
}

impl RouteDef {
    pub fn new(name: &str, path: &str, meta: RouteMeta) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            meta,
        }
    }

    pub fn matches_path(&self, path: &str) -> bool {
        let pattern: Vec<&str> = self.path.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn with_route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }

    pub fn find(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// First route whose pattern matches `path`
    pub fn match_path(&self, path: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.matches_path(path))
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }
}

/// The application's route table
pub fn default_routes() -> RouteTable {
    RouteTable::new()
        .with_route(RouteDef::new(ROUTE_LOGIN, "/login", RouteMeta::guest_only()))
        .with_route(RouteDef::new(
            ROUTE_ADMIN_HOME,
            "/admin",
            RouteMeta::for_role(StaffRole::Admin),
        ))
        .with_route(RouteDef::new(
            ROUTE_TEACHER_HOME,
            "/teacher",
            RouteMeta::for_role(StaffRole::Teacher),
        ))
        .with_route(RouteDef::new(
            "exam-scoring",
            "/teacher/exam/:examId",
            RouteMeta::for_role(StaffRole::Teacher),
        ))
        .with_route(RouteDef::new(
            "result-report",
            "/teacher/result",
            RouteMeta::for_role(StaffRole::Teacher),
        ))
        .with_route(RouteDef::new("student-verify", "/", RouteMeta::public()))
        .with_route(RouteDef::new(
            "student-exam",
            "/exam/:sessionId",
            RouteMeta::public(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_patterns() {
        let routes = default_routes();
        assert_eq!(routes.match_path("/teacher/exam/E1").unwrap().name, "exam-scoring");
        assert_eq!(routes.match_path("/teacher").unwrap().name, ROUTE_TEACHER_HOME);
        assert_eq!(routes.match_path("/admin/").unwrap().name, ROUTE_ADMIN_HOME);
        assert_eq!(routes.match_path("/").unwrap().name, "student-verify");
        assert_eq!(routes.match_path("/exam/S1?x=1").unwrap().name, "student-exam");
        assert!(routes.match_path("/nowhere").is_none());
    }

    #[test]
    fn test_default_routes_declare_homes() {
        let routes = default_routes();
        assert_eq!(
            routes.find(ROUTE_ADMIN_HOME).unwrap().meta.role,
            Some(StaffRole::Admin)
        );
        assert!(routes.find(ROUTE_LOGIN).unwrap().meta.guest_only);
    }
}
