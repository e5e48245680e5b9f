mod test_repeated_roster_is_ignored;
mod test_roster_offers_to_everyone;
