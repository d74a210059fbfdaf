use anyhow::Result;

fn main() -> Result<()> {
    println!("{}", pastemark::Config::json_schema()?);
    Ok(())
}
