//! Startup banner and end-of-session summary.

use crate::session::SessionStats;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub transport: &'a str,
    pub store: &'a str,
    pub latency: &'a str,
    pub faults: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║           S A N G U I N E             ║
   ║    believe first, reconcile later     ║
   ╚═══════════════════════════════════════╝

   version    {}
   transport  {}
   store      {}
   latency    {}
   faults     {}
"#,
        env!("CARGO_PKG_VERSION"),
        info.transport,
        info.store,
        info.latency,
        info.faults,
    );
}

/// Print the mutation tally and a farewell.
pub fn print_session_summary(stats: SessionStats) {
    println!(
        "\nsession: {} confirmed, {} rolled back, {} rejected ({} settled in total)",
        stats.confirmed,
        stats.rolled_back,
        stats.rejected,
        stats.settled(),
    );
    println!("goodbye.");
}
