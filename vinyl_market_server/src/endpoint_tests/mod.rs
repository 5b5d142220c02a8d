mod checkout;
mod helpers;
mod mocks;
mod orders;
mod reviews;
mod webhook;
