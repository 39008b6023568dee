/// Default compiler executable.
pub fn default_compiler() -> String {
    typeplan::DEFAULT_COMPILER.to_string()
}

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "typeplan.json";

/// Prefix of environment variables overriding top-level settings.
pub const ENV_PREFIX: &str = "TYPEPLAN_";

/// Name of the target built from `--src`/`--dest`.
pub const COMMAND_LINE_TARGET: &str = "command-line";
