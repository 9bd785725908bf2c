//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.display());
    if let Some(rustc) = &info.rustc {
        println!("Runtime:    {}", rustc);
    }
    if let Some(commit) = &info.commit {
        println!("Commit:     {}", commit);
    }
    if let Some(date) = &info.build_date {
        println!("Build date: {}", date);
    }

    Ok(())
}
