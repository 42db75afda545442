//! Version command

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;
use anyhow::Result;
use camino::Utf8Path;

pub fn run(args: VersionArgs, env: Option<&Utf8Path>) -> Result<()> {
    let info = VersionInfo::current().with_config(env);

    if args.json {
        return output::json(&info);
    }

    println!("{}", info);
    output::kv("user-agent", &info.user_agent);
    output::kv("config", info.config_path.as_deref().unwrap_or("-"));
    match &info.release {
        Some(release) => {
            output::kv("qa", &release.qa);
            output::kv("prod", &release.prod);
        }
        None => output::kv("release", "(configuration not loaded)"),
    }
    Ok(())
}
