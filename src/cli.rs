use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// One-shot request (e.g. "two big macs and a large coke"); omit for
    /// the interactive drive-thru session
    pub query: Option<String>,

    /// LLM provider [possible values: openai, openrouter, anthropic]
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Menu page to scrape instead of the default
    #[arg(long)]
    pub menu_url: Option<String>,

    /// Skip scraping and use the bundled menu
    #[arg(long)]
    pub static_menu: bool,
}
