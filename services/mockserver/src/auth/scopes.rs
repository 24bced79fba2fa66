//! Permission scopes checked by the API layer.
//!
//! A grant is either the bare scope (`streams:read`) or the scope narrowed to
//! resource ids (`streams:read:<id>`); see [`graymock_authz::scoped_permission`].
pub const STREAMS_READ: &str = "streams:read";
pub const STREAMS_EDIT: &str = "streams:edit";
pub const STREAMS_CREATE: &str = "streams:create";
pub const STREAMS_CHANGESTATE: &str = "streams:changestate";

pub const USERS_LIST: &str = "users:list";
pub const USERS_EDIT: &str = "users:edit";
pub const USERS_CREATE: &str = "users:create";
pub const USERS_TOKENLIST: &str = "users:tokenlist";
pub const USERS_TOKENCREATE: &str = "users:tokencreate";
pub const USERS_TOKENREMOVE: &str = "users:tokenremove";

pub const ROLES_READ: &str = "roles:read";
pub const ROLES_EDIT: &str = "roles:edit";
pub const ROLES_CREATE: &str = "roles:create";
pub const ROLES_DELETE: &str = "roles:delete";

pub const INDEXSETS_READ: &str = "indexsets:read";
pub const INDEXSETS_EDIT: &str = "indexsets:edit";
pub const INDEXSETS_CREATE: &str = "indexsets:create";
pub const INDEXSETS_DELETE: &str = "indexsets:delete";

pub const INPUTS_READ: &str = "inputs:read";
pub const INPUTS_EDIT: &str = "inputs:edit";
pub const INPUTS_CREATE: &str = "inputs:create";
pub const INPUTS_TERMINATE: &str = "inputs:terminate";

pub const DASHBOARDS_READ: &str = "dashboards:read";
pub const DASHBOARDS_EDIT: &str = "dashboards:edit";
pub const DASHBOARDS_CREATE: &str = "dashboards:create";
