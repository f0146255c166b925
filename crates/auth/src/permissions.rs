use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "stock.receive"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const ALL: Permission = Permission::from_static("*");
pub const CATALOG_READ: Permission = Permission::from_static("catalog.read");
pub const CATALOG_WRITE: Permission = Permission::from_static("catalog.write");
pub const STOCK_READ: Permission = Permission::from_static("stock.read");
pub const STOCK_RECEIVE: Permission = Permission::from_static("stock.receive");
pub const STOCK_DISPATCH: Permission = Permission::from_static("stock.dispatch");
pub const STOCK_TRANSFER: Permission = Permission::from_static("stock.transfer");
pub const STOCKTAKE_PERFORM: Permission = Permission::from_static("stocktake.perform");
pub const REPORTS_READ: Permission = Permission::from_static("reports.read");
pub const USERS_CREATE: Permission = Permission::from_static("users.create");
pub const CATALOG_SEED: Permission = Permission::from_static("catalog.seed");

/// Role → permission policy.
///
/// Admins hold the wildcard; managers additionally maintain the catalog.
pub fn permissions_for_role(role: Role) -> Vec<Permission> {
    let floor = [
        CATALOG_READ,
        STOCK_READ,
        STOCK_RECEIVE,
        STOCK_DISPATCH,
        STOCK_TRANSFER,
        STOCKTAKE_PERFORM,
        REPORTS_READ,
    ];

    match role {
        Role::Admin => vec![ALL],
        Role::Manager => floor.into_iter().chain([CATALOG_WRITE]).collect(),
        Role::Employee => floor.into_iter().collect(),
    }
}
