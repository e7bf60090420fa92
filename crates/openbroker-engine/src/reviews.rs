//! Post-trade reviews.

use openbroker_types::{
    constants::{MAX_RATING, MIN_RATING},
    AccountId, BrokerError, Notification, NotificationPayload, RatingSummary, Result, Review,
    TradeId, TradeStatus,
};

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Buyer leaves a review about the seller of a completed trade.
    ///
    /// # Errors
    /// - `NotTradeBuyer` if the caller is not this trade's buyer
    /// - `InvalidTransition` unless the trade is `Completed`
    /// - `InvalidRating` outside 1..=5
    /// - `ReviewAlreadyLeft` if the trade already has a review
    pub fn leave_review(
        &self,
        trade_id: TradeId,
        reviewer: AccountId,
        rating: u8,
        comment: &str,
    ) -> Result<(Review, Vec<Notification>)> {
        let trade = self.trades.get(trade_id)?;
        if !trade.is_buyer(reviewer) {
            return Err(BrokerError::NotTradeBuyer(trade_id));
        }
        if trade.status != TradeStatus::Completed {
            return Err(BrokerError::InvalidTransition {
                trade_id,
                status: trade.status,
                action: "leave_review",
            });
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(BrokerError::InvalidRating(rating));
        }

        let review = Review::new(reviewer, trade.seller, trade_id, rating, comment);
        self.reviews.insert(review.clone())?;

        self.audit.append(
            reviewer,
            "REVIEW_LEFT",
            format!("trade={trade_id} rating={rating}"),
        );

        let notifications = vec![Notification::new(
            trade.seller,
            NotificationPayload::ReviewReceived { trade_id, rating },
        )];
        Ok((review, notifications))
    }

    /// Average rating and review count for a seller.
    #[must_use]
    pub fn seller_rating(&self, seller: AccountId) -> RatingSummary {
        self.reviews.rating_summary(seller)
    }

    /// Latest reviews about a seller, newest first.
    #[must_use]
    pub fn seller_reviews(&self, seller: AccountId, limit: usize) -> Vec<Review> {
        self.reviews.for_target(seller, limit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openbroker_types::{
        BrokerConfig, DeliveryTarget, Listing, ListingId, PaymentStatus, ProofRef,
    };
    use rust_decimal::Decimal;

    use crate::gateway::StubGateway;

    use super::*;

    struct Fixture {
        engine: BrokerEngine,
        buyer: AccountId,
        seller: AccountId,
        listing_id: ListingId,
    }

    fn fixture() -> Fixture {
        let engine = BrokerEngine::new(BrokerConfig::default(), Arc::new(StubGateway::new()));
        let buyer = AccountId::new();
        let seller = AccountId::new();
        engine.register_account(buyer, "buyer");
        engine.register_account(seller, "seller");
        let listing = Listing::new(seller, "t", Decimal::new(5, 1), 1, 0, "bank", "");
        let listing_id = listing.id;
        engine.listings.insert(listing);
        Fixture {
            engine,
            buyer,
            seller,
            listing_id,
        }
    }

    fn completed_trade(fx: &Fixture) -> TradeId {
        let ticket = fx
            .engine
            .create_trade(fx.buyer, fx.listing_id, 1000, DeliveryTarget::new("tgt"))
            .unwrap();
        let id = ticket.trade.id;
        fx.engine
            .confirm_payment(id, PaymentStatus::Succeeded)
            .unwrap();
        fx.engine
            .submit_proof(id, fx.buyer, ProofRef::new("f"))
            .unwrap();
        fx.engine.confirm_delivery(id, fx.seller).unwrap();
        id
    }

    #[test]
    fn buyer_reviews_completed_trade() {
        let fx = fixture();
        let trade_id = completed_trade(&fx);

        let (review, notifications) = fx
            .engine
            .leave_review(trade_id, fx.buyer, 5, "smooth")
            .unwrap();
        assert_eq!(review.target, fx.seller);
        assert_eq!(notifications[0].recipient, fx.seller);

        let summary = fx.engine.seller_rating(fx.seller);
        assert_eq!(summary.count, 1);
        assert!((summary.average - 5.0).abs() < f64::EPSILON);
        assert_eq!(fx.engine.seller_reviews(fx.seller, 10).len(), 1);
    }

    #[test]
    fn review_guards() {
        let fx = fixture();
        let trade_id = completed_trade(&fx);

        assert!(matches!(
            fx.engine
                .leave_review(trade_id, fx.seller, 5, "")
                .unwrap_err(),
            BrokerError::NotTradeBuyer(_)
        ));
        assert!(matches!(
            fx.engine.leave_review(trade_id, fx.buyer, 0, "").unwrap_err(),
            BrokerError::InvalidRating(0)
        ));
        assert!(matches!(
            fx.engine.leave_review(trade_id, fx.buyer, 6, "").unwrap_err(),
            BrokerError::InvalidRating(6)
        ));

        fx.engine.leave_review(trade_id, fx.buyer, 4, "ok").unwrap();
        assert!(matches!(
            fx.engine.leave_review(trade_id, fx.buyer, 5, "").unwrap_err(),
            BrokerError::ReviewAlreadyLeft(_)
        ));
    }

    #[test]
    fn incomplete_trade_cannot_be_reviewed() {
        let fx = fixture();
        let ticket = fx
            .engine
            .create_trade(fx.buyer, fx.listing_id, 1000, DeliveryTarget::new("tgt"))
            .unwrap();
        assert!(matches!(
            fx.engine
                .leave_review(ticket.trade.id, fx.buyer, 5, "")
                .unwrap_err(),
            BrokerError::InvalidTransition { .. }
        ));
    }
}
