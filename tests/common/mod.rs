// Not every integration binary uses every helper.
#[allow(dead_code)]
pub(crate) mod test_utils;
