//! `softprobe extensions` – print the effective extension table.

use anyhow::Result;
use softprobe_core::config::SoftprobeConfig;

pub fn run_extensions(cfg: &SoftprobeConfig) -> Result<()> {
    cfg.validate()?;
    let table = cfg.extension_table();
    let mut current = None;
    let mut line = String::new();
    for ext in table.entries() {
        if current != Some(ext.category) {
            if let Some(cat) = current {
                println!("{:<9} {}", cat, line.trim_end());
            }
            current = Some(ext.category);
            line.clear();
        }
        line.push_str(&ext.name);
        line.push(' ');
    }
    if let Some(cat) = current {
        println!("{:<9} {}", cat, line.trim_end());
    }
    println!("{} extensions", table.len());
    Ok(())
}
