//! The interactive session
//!
//! Reads natural-language requests, surfaces join suggestions for the
//! tables a request mentions, generates SQL through the completion
//! client, and executes the query on confirmation. Any failure after
//! startup is printed and the loop continues; only the missing schema at
//! startup is fatal (handled in main).

use duckdb::Connection;
use p2q_duck::{execute_query, QueryOutcome};
use p2q_schema::SchemaSnapshot;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::config::Config;
use crate::export::export_to_csv;
use crate::llm::{normalize_sql, SqlGenerator};
use crate::render::render_outcome;
use crate::spinner::Spinner;

pub async fn run(
    conn: &Connection,
    snapshot: &SchemaSnapshot,
    generator: &dyn SqlGenerator,
    config: &Config,
) -> anyhow::Result<()> {
    let schema_text = snapshot.describe();
    let mut editor = DefaultEditor::new()?;

    println!("\nWelcome to Prompt2Query CLI!");
    println!("Type 'help' for available commands.");
    println!("Enter your prompt (or type 'exit' to quit):");
    println!(
        "Query results can be exported to CSV in the '{}' directory.\n",
        config.export.directory
    );

    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("\nOperation cancelled by user.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input.to_lowercase().as_str() {
            "help" => {
                display_help();
                continue;
            }
            "tables" => {
                display_tables(snapshot);
                continue;
            }
            "schema" => {
                println!("\nDatabase Schema:");
                println!("{schema_text}\n");
                continue;
            }
            "clear" => {
                // ANSI clear screen + cursor home.
                print!("\x1b[2J\x1b[1;1H");
                continue;
            }
            "exit" | "quit" => break,
            _ => {}
        }

        if let Err(err) =
            handle_request(&mut editor, conn, snapshot, &schema_text, generator, config, input)
                .await
        {
            println!("Error: {err}");
        }

        println!("\n-------------------------------\n");
    }

    println!("\nThank you for using Prompt2Query CLI!");
    Ok(())
}

fn display_help() {
    println!("\nAvailable Commands:");
    println!("  help - Display this help message");
    println!("  tables - List all available tables");
    println!("  schema - Show complete database schema");
    println!("  clear - Clear the screen");
    println!("  exit - Exit the application");
    println!("\nFor any other input, enter your query in natural language.");
    println!("Examples:");
    println!("  > Show me all users who joined last month");
    println!("  > What are the top 5 products by revenue?");
    println!();
}

fn display_tables(snapshot: &SchemaSnapshot) {
    println!("\nAvailable Tables:");
    let mut names: Vec<&str> = snapshot.table_names().collect();
    names.sort_unstable();
    for name in names {
        println!("  {name}");
    }
    println!();
}

async fn handle_request(
    editor: &mut DefaultEditor,
    conn: &Connection,
    snapshot: &SchemaSnapshot,
    schema_text: &str,
    generator: &dyn SqlGenerator,
    config: &Config,
    request: &str,
) -> anyhow::Result<()> {
    let mentioned = snapshot.tables_mentioned_in(request);
    if !mentioned.is_empty() {
        let spinner = Spinner::start("Analyzing possible JOIN patterns...");
        let suggested = snapshot.suggest_joins(&mentioned);
        spinner.stop();

        if !suggested.is_empty() {
            println!("\nSuggested JOIN patterns:");
            for join in &suggested {
                println!("  {join}");
            }
        }
    }

    println!();
    let spinner = Spinner::start("Generating SQL query...");
    let raw = generator.generate_sql(request, schema_text).await;
    spinner.stop();
    let sql = normalize_sql(&raw?);

    println!("\nGenerated SQL Query:");
    println!("{sql}");

    let confirm = match prompt(editor, "\nExecute this query? (y/n): ")? {
        Some(answer) => answer,
        None => return Ok(()),
    };
    if !confirm.trim().eq_ignore_ascii_case("y") {
        println!("Query execution skipped.");
        return Ok(());
    }

    let spinner = Spinner::start("Executing query...");
    let outcome = execute_query(conn, &sql);
    spinner.stop();
    let outcome = outcome?;

    println!("\nQuery Result:");
    println!("{}", render_outcome(&outcome));

    if let QueryOutcome::Rows(result) = &outcome {
        if !result.rows.is_empty() {
            offer_export(editor, result, config)?;
        }
    }

    Ok(())
}

/// Offer CSV export, re-prompting until a y/n answer arrives.
fn offer_export(
    editor: &mut DefaultEditor,
    result: &p2q_duck::QueryResult,
    config: &Config,
) -> anyhow::Result<()> {
    loop {
        let answer =
            match prompt(editor, "\nWould you like to export these results to CSV? (y/n): ")? {
                Some(answer) => answer.trim().to_lowercase(),
                None => return Ok(()),
            };

        match answer.as_str() {
            "y" => {
                let filename = match prompt(
                    editor,
                    "Enter filename (press Enter for automatic name): ",
                )? {
                    Some(name) => name.trim().to_string(),
                    None => return Ok(()),
                };
                let filename = if filename.is_empty() {
                    None
                } else {
                    Some(filename.as_str())
                };

                let dir = std::path::Path::new(&config.export.directory);
                match export_to_csv(result, filename, dir) {
                    Ok(path) => println!("\nResults exported to: {}", path.display()),
                    Err(err) => println!("\nError exporting to CSV: {err}"),
                }
                return Ok(());
            }
            "n" => return Ok(()),
            _ => println!("Please enter 'y' or 'n'"),
        }
    }
}

/// Read one line; Ctrl-C or EOF answers `None` (treated as a cancel).
fn prompt(editor: &mut DefaultEditor, text: &str) -> anyhow::Result<Option<String>> {
    match editor.readline(text) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("\nOperation cancelled by user.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
