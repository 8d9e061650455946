use flow_spotlight::{flow, scene};

fn main() -> anyhow::Result<()> {
    flow::run(vec![scene::constructor()])
}
