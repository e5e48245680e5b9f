mod test_offer_is_answered;
