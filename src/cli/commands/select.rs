use crate::cli::parser::Commands;
use crate::core::select::SelectLogic;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands) -> AppResult<()> {
    if let Commands::Select {
        script,
        report_type,
        passwords,
    } = cmd
    {
        let script = SelectLogic::load_script(script)?;
        let outcome = SelectLogic::replay(&script, *report_type, *passwords);

        info(format!(
            "Mode: {} · {} row(s) selected of {}",
            outcome.state.mode(),
            outcome.count,
            script.total
        ));
        if !script.page_keys.is_empty() {
            let checked: Vec<&str> = outcome.checked.iter().map(|k| k.as_str()).collect();
            info(format!("Checked on page: {}", checked.join(", ")));
        }

        println!("{}", serde_json::to_string_pretty(&outcome.request)?);
    }
    Ok(())
}
