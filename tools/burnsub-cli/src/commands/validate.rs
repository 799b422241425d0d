//! Check every language of a caption set for groupable timing.

use std::path::PathBuf;

use burnsub_caption_model::group_captions;

pub fn run(input: PathBuf) -> anyhow::Result<()> {
    println!("Validating captions at: {}", input.display());
    let set = super::load_captions(&input)?;

    let mut problems = 0;
    for language in set.languages() {
        let list = set.captions(language)?;
        match group_captions(&list.captions) {
            Ok(groups) => {
                let zero = groups.iter().filter(|g| g.is_zero_duration()).count();
                println!("  {language}: {} cue(s), {} group(s)", list.len(), groups.len());
                if zero > 0 {
                    println!("    {zero} zero-duration group(s)");
                }
            }
            Err(e) => {
                problems += 1;
                println!("  {language}: {e}");
            }
        }
    }

    if problems == 0 {
        println!("\nCaptions are valid.");
        Ok(())
    } else {
        Err(anyhow::anyhow!("{problems} language(s) cannot be rendered"))
    }
}
