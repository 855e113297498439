//! `search` command: runs one paged traversal and prints pages as they land.

use std::sync::Arc;

use clap::{Args, ValueEnum};
use placehunt_places::{
    parse_location, retain_mobile, PageResult, PageTraversal, PlacesClient, QueryParameters,
    RankBy, TraversalOptions,
};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable page blocks
    Text,
    /// One JSON page per line
    Json,
}

/// Arguments for `placehunt search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search centre, as `lat,lng` or `{"lat":..,"lng":..}`
    #[arg(long)]
    pub location: String,

    /// Search radius in metres (required unless ranking by distance)
    #[arg(long)]
    pub radius: Option<u32>,

    #[arg(long)]
    pub keyword: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Place type, e.g. `restaurant`
    #[arg(long = "type")]
    pub place_type: Option<String>,

    /// `prominence` or `distance`
    #[arg(long)]
    pub rankby: Option<RankBy>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub minprice: Option<u8>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub maxprice: Option<u8>,

    /// Only return places open right now
    #[arg(long)]
    pub opennow: bool,

    /// Resume from a page token returned by an earlier search
    #[arg(long)]
    pub pagetoken: Option<String>,

    /// Maximum page number to fetch (defaults to `PLACEHUNT_MAX_DEPTH`)
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Pages already fetched by an earlier search; numbering continues from here
    #[arg(long, default_value_t = 0)]
    pub current_depth: u32,

    /// Show every phone number instead of mobile numbers only
    #[arg(long)]
    pub all_numbers: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl SearchArgs {
    /// Builds validated search parameters from the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the location does not parse or the combination of
    /// arguments would be rejected upstream.
    pub(crate) fn to_params(&self) -> anyhow::Result<QueryParameters> {
        let params = QueryParameters {
            radius: self.radius,
            keyword: self.keyword.clone(),
            name: self.name.clone(),
            place_type: self.place_type.clone(),
            rankby: self.rankby,
            language: self.language.clone(),
            minprice: self.minprice,
            maxprice: self.maxprice,
            opennow: self.opennow.then_some(true),
            pagetoken: self.pagetoken.clone(),
            ..QueryParameters::new(parse_location(&self.location)?)
        };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn traversal_options(&self, config: &placehunt_core::AppConfig) -> TraversalOptions {
        let defaults = TraversalOptions::from_app_config(config);
        TraversalOptions {
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            current_depth: self.current_depth,
            ..defaults
        }
    }
}

/// Runs the search and prints each page through `render` as it arrives.
///
/// Ctrl-C stops the traversal before its next page request; pages already
/// printed stay printed.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the client cannot be built,
/// or a page request fails. In the last case the message says how many pages
/// were printed first.
pub(crate) async fn run_search(
    config: &placehunt_core::AppConfig,
    args: SearchArgs,
) -> anyhow::Result<()> {
    let params = args.to_params()?;
    let options = args.traversal_options(config);
    let max_depth = options.max_depth;

    let client = Arc::new(PlacesClient::from_app_config(config)?);
    let traversal = PageTraversal::new(Arc::clone(&client), client, params, options);

    let cancel = traversal.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping after the current page");
            cancel.cancel();
        }
    });

    let mut printed: usize = 0;
    let result = traversal
        .for_each_page(|page| {
            print_page(page, args.format, args.all_numbers);
            printed += 1;
        })
        .await;
    interrupt.abort();

    match result {
        Ok(0) => {
            println!("no pages fetched (max depth {max_depth})");
            Ok(())
        }
        Ok(pages) => {
            tracing::info!(pages, "search finished");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("search failed after {printed} page(s)"))),
    }
}

fn print_page(mut page: PageResult, format: OutputFormat, all_numbers: bool) {
    match format {
        OutputFormat::Text => print!("{}", render::render_page(&page, all_numbers)),
        OutputFormat::Json => {
            if !all_numbers {
                page.single_location = retain_mobile(page.single_location);
            }
            match serde_json::to_string(&page) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(
                    page_number = page.page_number,
                    error = %e,
                    "failed to encode page as JSON"
                ),
            }
        }
    }
}
