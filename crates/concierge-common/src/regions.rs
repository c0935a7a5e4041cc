//! Region table used to expand `"all"`

/// Keyword that stands for every region in [`ALL_REGIONS`]
pub const ALL: &str = "all";

/// Region used for global services and as the default bucket/topic region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Regions covered by `"all"`, in fan-out order
pub const ALL_REGIONS: [&str; 9] = [
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "sa-east-1",
];

/// Expand a declared region list.
///
/// `"all"` is replaced in place by [`ALL_REGIONS`]. The result keeps first
/// occurrence order with duplicates removed.
pub fn expand_regions<S: AsRef<str>>(declared: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |region: &str| {
        if !out.iter().any(|r| r == region) {
            out.push(region.to_string());
        }
    };
    for region in declared {
        let region = region.as_ref().trim();
        if region.eq_ignore_ascii_case(ALL) {
            for r in ALL_REGIONS {
                push(r);
            }
        } else if !region.is_empty() {
            push(region);
        }
    }
    out
}
