use std::fs;

use anyhow::{Context, Result};

use tally_data::Member;

/// Load a roster snapshot from a JSON file and keep only the
/// members that can be billed. The file is exported by the
/// club administration; this tool never writes it.
pub fn load_roster(path: &str) -> Result<Vec<Member>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading roster {}", path))?;
    let members: Vec<Member> = serde_json::from_str(&data)
        .with_context(|| format!("parsing roster {}", path))?;
    Ok(members
        .into_iter()
        .filter(|member| member.is_billable())
        .collect())
}
