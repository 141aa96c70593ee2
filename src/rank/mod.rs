pub(crate) mod ranker;
