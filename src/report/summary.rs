use colored::Colorize;

use crate::runner::state::SessionResults;

/// 0 when at least one probe ran and every one passed; 1 otherwise
pub fn exit_code(results: &SessionResults) -> i32 {
    if results.all_passed() {
        0
    } else {
        1
    }
}

/// Success rate for display, two decimals
pub fn format_success_rate(results: &SessionResults) -> Option<String> {
    results.success_rate().map(|rate| format!("{:.2}%", rate))
}

/// Print the human summary and return the process exit status
pub fn print_summary(results: &SessionResults) -> i32 {
    let rule = "=".repeat(80);

    println!("\n{}", rule);
    println!("{}", "TEST SUMMARY".cyan());
    println!("{}", rule);
    println!("Total:   {}", results.total());
    println!("{}", format!("Passed:  {}", results.passed()).green());
    println!("{}", format!("Failed:  {}", results.failed()).red());
    println!("{}", format!("Skipped: {}", results.skipped()).yellow());
    println!("{}\n", rule);

    match format_success_rate(results) {
        Some(rate) => println!("Success Rate: {}\n", rate),
        None => println!("{}\n", "No tests were recorded".yellow()),
    }

    let code = exit_code(results);
    if code == 0 {
        println!("{}\n", "🎉 ALL TESTS PASSED! 🎉".green().bold());
    } else if results.total() > 0 {
        println!("{}\n", "❌ SOME TESTS FAILED".red().bold());
    }
    code
}
