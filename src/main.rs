use clap::Parser;
use petoron_vault::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt {
            ref path,
            ref out,
            bits,
            cost,
        } => commands::encrypt::execute(path, out.as_deref(), bits, cost),
        Commands::Decrypt {
            ref vault,
            ref out,
            ref to,
            ref pass_out,
            hidden,
        } => commands::decrypt::execute(vault, out, to.as_deref(), pass_out.as_deref(), hidden),
        Commands::View {
            ref vault,
            ref search,
            hidden,
            all,
        } => commands::view::execute(vault, search.as_deref(), hidden, all),
        Commands::Extract {
            ref vault,
            ref paths,
            ref out,
            ref to,
            ref pass_out,
            hidden,
        } => commands::extract::execute(
            vault,
            paths,
            out,
            to.as_deref(),
            pass_out.as_deref(),
            hidden,
        ),
        Commands::Add {
            ref vault,
            ref paths,
        } => commands::add::execute(vault, paths),
        Commands::Delete {
            ref vault,
            ref paths,
        } => commands::delete::execute(vault, paths),
        Commands::Edit {
            ref vault,
            ref target,
            ref from,
        } => commands::edit::execute(vault, target, from),
        Commands::StealthSet {
            ref vault,
            ref paths,
        } => commands::stealth::execute(vault, paths, true),
        Commands::StealthClear {
            ref vault,
            ref paths,
        } => commands::stealth::execute(vault, paths, false),
        Commands::Transfer {
            ref src,
            ref dst,
            ref paths,
            hidden,
        } => commands::transfer::execute(src, dst, paths, hidden),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(e.exit_code() as i32);
    }
}
