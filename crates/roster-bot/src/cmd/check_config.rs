use anyhow::Result;

use crate::settings::ConfigArgs;

pub fn run(config: ConfigArgs) -> Result<()> {
    let settings = config.resolve()?;
    println!("Configuration OK");
    for line in settings.summary() {
        println!("  {line}");
    }
    Ok(())
}
