//! The starting world used when no save exists.
//!
//! Two sects with one disciple each. The player plays the first.

use sectomie_cultivators::{Roster, RosterError};
use sectomie_types::{Attributes, Member, RealmStage, Sect};
use tracing::info;

/// Name of the sect the player manages in the seeded world.
pub const PLAYER_SECT: &str = "Azure Peak Sect";

fn azure_peak() -> Sect {
    let mut sect = Sect::found(
        PLAYER_SECT,
        "Sword Dao",
        3,
        "A prestigious sword cultivation sect located on Azure Peak Mountain",
    );
    sect.add_territory("Azure Peak Mountain", 4);
    sect.techniques = vec![
        String::from("Azure Sword Art"),
        String::from("Flowing Water Sword Technique"),
        String::from("Mountain Cleaving Sword"),
    ];
    sect
}

fn mystic_cloud() -> Sect {
    let mut sect = Sect::found(
        "Mystic Cloud Sect",
        "Alchemy Dao",
        5,
        "Ancient sect renowned for its alchemy and medicine cultivation",
    );
    sect.add_territory("Cloud Valley", 6);
    sect.techniques = vec![
        String::from("Five Elements Pill Refinement"),
        String::from("Cloud Gathering Formation"),
        String::from("Spiritual Essence Extraction"),
    ];
    sect
}

fn li_mei() -> Member {
    let mut member = Member::new("Li Mei", 20, "Sword", Attributes::new(85.0, 65.0, 75.0));
    member.techniques.insert(String::from("Azure Sword Art"));
    member
}

fn zhang_wei() -> Member {
    let mut member = Member::new("Zhang Wei", 35, "Alchemy", Attributes::new(60.0, 90.0, 80.0));
    member
        .techniques
        .insert(String::from("Five Elements Pill Refinement"));
    member.realm = 2;
    member.realm_stage = RealmStage::Late;
    member.set_max_qi(400.0);
    member.set_qi(350.0);
    member
}

/// Build the starting roster.
pub fn seed_world() -> Result<Roster, RosterError> {
    let mut roster = Roster::new();
    let azure = roster.insert_sect(azure_peak())?;
    let cloud = roster.insert_sect(mystic_cloud())?;
    roster.enroll(li_mei(), azure)?;
    roster.enroll(zhang_wei(), cloud)?;
    info!(
        sects = roster.sect_count(),
        members = roster.member_count(),
        "starting world seeded"
    );
    Ok(roster)
}
