pub mod commands {
    pub const ENV_LIST: &str = "VX101";
    pub const ENV_CREATE: &str = "VX110";
    pub const ENV_ADD: &str = "VX111";
    pub const ENV_ACTIVATE: &str = "VX120";
    pub const ENV_DELETE: &str = "VX130";
    pub const PKG_LIST: &str = "VX201";
    pub const PKG_INSTALL: &str = "VX210";
    pub const PKG_UNINSTALL: &str = "VX211";
    pub const PKG_UPDATE: &str = "VX220";
    pub const PKG_UNUSED: &str = "VX230";
    pub const PKG_SEARCH: &str = "VX240";
    pub const REQS: &str = "VX301";
    pub const GENERIC: &str = "VX000";
}
