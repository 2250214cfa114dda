mod stripe_signature;

pub use stripe_signature::{
    sign_payload,
    verify_signature,
    SignatureError,
    StripeSignatureMiddlewareFactory,
    StripeSignatureMiddlewareService,
    STRIPE_SIGNATURE_HEADER,
};
