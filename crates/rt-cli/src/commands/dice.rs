use colored::Colorize;
use rt_dice::DiceExpr;

pub fn run(expr: &str, count: u32, seed: Option<u64>) -> Result<(), String> {
    let dice: DiceExpr = expr.parse().map_err(|e| format!("{e}"))?;
    let mut rng = super::engine_config(seed).rng();

    println!(
        "  {} {}",
        dice.to_string().bold(),
        format!("range {}", dice.range()).dimmed()
    );
    for _ in 0..count {
        let roll = dice.roll(&mut rng);
        println!("  {roll}");
    }
    Ok(())
}
