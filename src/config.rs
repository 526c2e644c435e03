/// User id written into the `<myinfo>` header unless overridden on the command line
pub const DEFAULT_USER_ID: &str = "0";

/// User name written into the `<myinfo>` header unless overridden on the command line
pub const DEFAULT_USER_NAME: &str = "malconv";

/// MyAnimeList export type marker (1 = anime, 2 = manga)
pub const EXPORT_TYPE_MANGA: &str = "2";

/// Suffix replacing `.csv` on the input file name to form the output path
pub const OUTPUT_SUFFIX: &str = "_mal.xml";

/// Date written when the source date is missing or unparseable
pub const DATE_SENTINEL: &str = "0000-00-00";

/// Progress update interval (tick every N rows)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Indentation width of the generated XML
pub const XML_INDENT: usize = 4;
